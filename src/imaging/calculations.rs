//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! | Class | Photo | Video |
//! |---|---|---|
//! | SM | longest edge → 320 | longest edge → 427 |
//! | M | shortest edge → 320 | longest edge → 640 |
//! | XL | shortest edge → 1280 | source size |
//!
//! Every rule only scales down: when the constrained edge is already within
//! the threshold, the source size is returned unchanged.

use crate::types::{MediaKind, SizeClass};

pub const PHOTO_SM_LONG_EDGE: u32 = 320;
pub const PHOTO_M_SHORT_EDGE: u32 = 320;
pub const PHOTO_XL_SHORT_EDGE: u32 = 1280;
pub const VIDEO_SM_LONG_EDGE: u32 = 427;
pub const VIDEO_M_LONG_EDGE: u32 = 640;

/// Which edge a rule caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Longest,
    Shortest,
}

/// A single sizing rule: cap one edge at `limit`, or leave the source alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    Constrain { edge: Edge, limit: u32 },
    Original,
}

/// The rule for a (class, kind) pair.
pub fn size_rule(class: SizeClass, kind: MediaKind) -> SizeRule {
    use Edge::{Longest, Shortest};
    match (kind, class) {
        (MediaKind::Photo, SizeClass::Sm) => SizeRule::Constrain {
            edge: Longest,
            limit: PHOTO_SM_LONG_EDGE,
        },
        (MediaKind::Photo, SizeClass::M) => SizeRule::Constrain {
            edge: Shortest,
            limit: PHOTO_M_SHORT_EDGE,
        },
        (MediaKind::Photo, SizeClass::Xl) => SizeRule::Constrain {
            edge: Shortest,
            limit: PHOTO_XL_SHORT_EDGE,
        },
        (MediaKind::Video, SizeClass::Sm) => SizeRule::Constrain {
            edge: Longest,
            limit: VIDEO_SM_LONG_EDGE,
        },
        (MediaKind::Video, SizeClass::M) => SizeRule::Constrain {
            edge: Longest,
            limit: VIDEO_M_LONG_EDGE,
        },
        (MediaKind::Video, SizeClass::Xl) => SizeRule::Original,
    }
}

/// Target `(width, height)` for a source of `width`×`height`.
///
/// # Examples
/// ```
/// # use syno_thumbs::imaging::target_size;
/// # use syno_thumbs::types::{MediaKind, SizeClass};
/// assert_eq!(target_size(4000, 3000, SizeClass::M, MediaKind::Photo), (427, 320));
/// assert_eq!(target_size(1920, 1080, SizeClass::Sm, MediaKind::Video), (427, 240));
/// assert_eq!(target_size(1920, 1080, SizeClass::Xl, MediaKind::Video), (1920, 1080));
/// ```
pub fn target_size(width: u32, height: u32, class: SizeClass, kind: MediaKind) -> (u32, u32) {
    match size_rule(class, kind) {
        SizeRule::Constrain { edge, limit } => constrain_edge((width, height), edge, limit),
        SizeRule::Original => (width, height),
    }
}

/// Cap the chosen edge at `limit`, scaling the other edge proportionally.
///
/// Ties (square sources) treat width as the longest and height as the shortest
/// edge; for a square both choices give the same result.
pub fn constrain_edge(source: (u32, u32), edge: Edge, limit: u32) -> (u32, u32) {
    let (w, h) = source;
    let width_is_constrained = match edge {
        Edge::Longest => w >= h,
        Edge::Shortest => w < h,
    };

    if width_is_constrained {
        if w <= limit {
            return source;
        }
        (limit, scale_edge(h, limit, w))
    } else {
        if h <= limit {
            return source;
        }
        (scale_edge(w, limit, h), limit)
    }
}

/// `round(other * limit / constrained)`, halves to even, never below 1.
fn scale_edge(other: u32, limit: u32, constrained: u32) -> u32 {
    let scaled = (other as f64 * limit as f64 / constrained as f64).round_ties_even() as u32;
    scaled.max(1)
}

/// Longer of the two edges; the photo encoder takes its bounding box from this.
pub fn long_edge(size: (u32, u32)) -> u32 {
    size.0.max(size.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SIZES: &[(u32, u32)] = &[
        (1, 1),
        (2, 5000),
        (5000, 2),
        (319, 320),
        (320, 320),
        (321, 320),
        (427, 240),
        (640, 480),
        (1280, 720),
        (1920, 1080),
        (1080, 1920),
        (3000, 4000),
        (4000, 3000),
        (4032, 3024),
        (6000, 6000),
        (12000, 35),
    ];

    fn all_rules() -> Vec<(SizeClass, MediaKind)> {
        let mut rules = Vec::new();
        for kind in [MediaKind::Photo, MediaKind::Video] {
            for class in SizeClass::ALL {
                rules.push((class, kind));
            }
        }
        rules
    }

    // =========================================================================
    // Photo scenarios
    // =========================================================================

    #[test]
    fn photo_landscape_4000x3000() {
        assert_eq!(target_size(4000, 3000, SizeClass::Sm, MediaKind::Photo), (320, 240));
        assert_eq!(target_size(4000, 3000, SizeClass::M, MediaKind::Photo), (427, 320));
        assert_eq!(target_size(4000, 3000, SizeClass::Xl, MediaKind::Photo), (1707, 1280));
    }

    #[test]
    fn photo_portrait_3000x4000() {
        assert_eq!(target_size(3000, 4000, SizeClass::Sm, MediaKind::Photo), (240, 320));
        assert_eq!(target_size(3000, 4000, SizeClass::M, MediaKind::Photo), (320, 427));
        assert_eq!(target_size(3000, 4000, SizeClass::Xl, MediaKind::Photo), (1280, 1707));
    }

    #[test]
    fn photo_small_source_is_unchanged() {
        assert_eq!(target_size(300, 200, SizeClass::Sm, MediaKind::Photo), (300, 200));
        assert_eq!(target_size(800, 300, SizeClass::M, MediaKind::Photo), (800, 300));
        assert_eq!(target_size(2000, 1000, SizeClass::Xl, MediaKind::Photo), (2000, 1000));
    }

    #[test]
    fn photo_square() {
        assert_eq!(target_size(1000, 1000, SizeClass::Sm, MediaKind::Photo), (320, 320));
        assert_eq!(target_size(1000, 1000, SizeClass::M, MediaKind::Photo), (320, 320));
    }

    // =========================================================================
    // Video scenarios
    // =========================================================================

    #[test]
    fn video_1080p() {
        assert_eq!(target_size(1920, 1080, SizeClass::Sm, MediaKind::Video), (427, 240));
        assert_eq!(target_size(1920, 1080, SizeClass::M, MediaKind::Video), (640, 360));
        assert_eq!(target_size(1920, 1080, SizeClass::Xl, MediaKind::Video), (1920, 1080));
    }

    #[test]
    fn video_portrait_phone_clip() {
        assert_eq!(target_size(1080, 1920, SizeClass::Sm, MediaKind::Video), (240, 427));
        assert_eq!(target_size(1080, 1920, SizeClass::M, MediaKind::Video), (360, 640));
    }

    #[test]
    fn video_xl_never_scales() {
        assert_eq!(target_size(7680, 4320, SizeClass::Xl, MediaKind::Video), (7680, 4320));
    }

    // =========================================================================
    // Edge cases
    // =========================================================================

    #[test]
    fn extreme_aspect_floors_at_one() {
        assert_eq!(target_size(12000, 5, SizeClass::Sm, MediaKind::Photo), (320, 1));
        assert_eq!(target_size(5, 12000, SizeClass::Sm, MediaKind::Video), (1, 427));
    }

    #[test]
    fn shortest_edge_rule_on_extreme_panorama() {
        // 20000x400: shortest 400 > 320 → 16000x320
        assert_eq!(target_size(20000, 400, SizeClass::M, MediaKind::Photo), (16000, 320));
    }

    #[test]
    fn exact_halves_round_to_even() {
        // 853 * 320 / 640 = 426.5
        assert_eq!(target_size(853, 640, SizeClass::M, MediaKind::Photo), (426, 320));
        // 481 * 320 / 640 = 240.5
        assert_eq!(target_size(640, 481, SizeClass::Sm, MediaKind::Photo), (320, 240));
        // 3413 * 1280 / 2560 = 1706.5
        assert_eq!(target_size(3413, 2560, SizeClass::Xl, MediaKind::Photo), (1706, 1280));
        // 427 * 427 / 854 = 213.5
        assert_eq!(target_size(854, 427, SizeClass::Sm, MediaKind::Video), (427, 214));
    }

    #[test]
    fn long_edge_picks_max() {
        assert_eq!(long_edge((427, 320)), 427);
        assert_eq!(long_edge((240, 320)), 320);
    }

    // =========================================================================
    // Properties over a sample grid
    // =========================================================================

    #[test]
    fn target_size_is_idempotent() {
        for &(w, h) in SAMPLE_SIZES {
            for (class, kind) in all_rules() {
                let once = target_size(w, h, class, kind);
                let twice = target_size(once.0, once.1, class, kind);
                assert_eq!(once, twice, "{w}x{h} {class} {kind}");
            }
        }
    }

    #[test]
    fn never_produces_zero_or_upscales() {
        for &(w, h) in SAMPLE_SIZES {
            for (class, kind) in all_rules() {
                let (tw, th) = target_size(w, h, class, kind);
                assert!(tw >= 1 && th >= 1, "{w}x{h} {class} {kind}");
                assert!(tw <= w && th <= h, "{w}x{h} {class} {kind} → {tw}x{th}");
            }
        }
    }

    #[test]
    fn constrained_edge_hits_limit_exactly() {
        for &(w, h) in SAMPLE_SIZES {
            for (class, kind) in all_rules() {
                let SizeRule::Constrain { edge, limit } = size_rule(class, kind) else {
                    continue;
                };
                let constrained = match edge {
                    Edge::Longest => w.max(h),
                    Edge::Shortest => w.min(h),
                };
                let (tw, th) = target_size(w, h, class, kind);
                if constrained <= limit {
                    assert_eq!((tw, th), (w, h));
                } else {
                    let got = match edge {
                        Edge::Longest => tw.max(th),
                        Edge::Shortest => tw.min(th),
                    };
                    assert_eq!(got, limit, "{w}x{h} {class} {kind}");
                }
            }
        }
    }
}
