//! Bundled status bar images.
//!
//! All images are compiled into the binary. File names ending in `Template.png` are macOS
//! template images and get tinted by the system to match the menu bar appearance. The plain
//! spacer is a wide transparent strip: while it is shown, every status item laid out to its
//! left is pushed off screen.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconAsset {
    Spacer,
    SpacerMove,
    Expand,
    ExpandPressed,
    Collapse,
    CollapsePressed,
    CollapseProgress100,
    CollapseProgress75,
    CollapseProgress50,
    CollapseProgress25,
}

/// Countdown frames, from "just started collapsing" to "fully collapsed".
pub const COLLAPSE_PROGRESS: [IconAsset; 4] = [
    IconAsset::CollapseProgress100,
    IconAsset::CollapseProgress75,
    IconAsset::CollapseProgress50,
    IconAsset::CollapseProgress25,
];

impl IconAsset {
    pub const ALL: [IconAsset; 10] = [
        IconAsset::Spacer,
        IconAsset::SpacerMove,
        IconAsset::Expand,
        IconAsset::ExpandPressed,
        IconAsset::Collapse,
        IconAsset::CollapsePressed,
        IconAsset::CollapseProgress100,
        IconAsset::CollapseProgress75,
        IconAsset::CollapseProgress50,
        IconAsset::CollapseProgress25,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Spacer => "spacer.png",
            Self::SpacerMove => "dotTemplate.png",
            Self::Expand => "expandTemplate.png",
            Self::ExpandPressed => "expandPushedTemplate.png",
            Self::Collapse => "collapseTemplate.png",
            Self::CollapsePressed => "collapsePushedTemplate.png",
            Self::CollapseProgress100 => "collapse100Template.png",
            Self::CollapseProgress75 => "collapse75Template.png",
            Self::CollapseProgress50 => "collapse50Template.png",
            Self::CollapseProgress25 => "collapse25Template.png",
        }
    }

    pub fn png_bytes(self) -> &'static [u8] {
        match self {
            Self::Spacer => include_bytes!("../icons/tray/spacer.png"),
            Self::SpacerMove => include_bytes!("../icons/tray/dotTemplate.png"),
            Self::Expand => include_bytes!("../icons/tray/expandTemplate.png"),
            Self::ExpandPressed => include_bytes!("../icons/tray/expandPushedTemplate.png"),
            Self::Collapse => include_bytes!("../icons/tray/collapseTemplate.png"),
            Self::CollapsePressed => include_bytes!("../icons/tray/collapsePushedTemplate.png"),
            Self::CollapseProgress100 => include_bytes!("../icons/tray/collapse100Template.png"),
            Self::CollapseProgress75 => include_bytes!("../icons/tray/collapse75Template.png"),
            Self::CollapseProgress50 => include_bytes!("../icons/tray/collapse50Template.png"),
            Self::CollapseProgress25 => include_bytes!("../icons/tray/collapse25Template.png"),
        }
    }

    pub fn is_template(self) -> bool {
        self.file_name().ends_with("Template.png")
    }

    /// Position in [`IconAsset::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Picks the countdown frame for `remaining` seconds out of `duration`.
///
/// `max(0, n - 1 - round((n - 1) * remaining / duration))`, clamped to the last frame.
pub fn countdown_frame(remaining: u32, duration: u32, frame_count: usize) -> usize {
    let last = frame_count.saturating_sub(1);
    if duration == 0 {
        return last;
    }
    let scaled = (last as f64 * f64::from(remaining) / f64::from(duration)).round();
    let frame = last as f64 - scaled;
    if frame <= 0.0 {
        0
    } else {
        (frame as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_every_asset_is_a_png() {
        for asset in IconAsset::ALL {
            assert!(
                asset.png_bytes().starts_with(PNG_SIGNATURE),
                "{} is not a PNG",
                asset.file_name()
            );
        }
    }

    #[test]
    fn test_index_matches_position_in_all() {
        for (i, asset) in IconAsset::ALL.iter().enumerate() {
            assert_eq!(asset.index(), i);
        }
    }

    #[test]
    fn test_only_plain_spacer_is_not_a_template() {
        let non_template: Vec<_> = IconAsset::ALL
            .into_iter()
            .filter(|a| !a.is_template())
            .collect();
        assert_eq!(non_template, vec![IconAsset::Spacer]);
    }

    #[test]
    fn test_countdown_frame_endpoints() {
        assert_eq!(countdown_frame(15, 15, 4), 0);
        assert_eq!(countdown_frame(0, 15, 4), 3);
    }

    #[test]
    fn test_countdown_frame_is_monotonic() {
        let frames: Vec<_> = (0..=15).rev().map(|r| countdown_frame(r, 15, 4)).collect();
        assert!(frames.windows(2).all(|w| w[0] <= w[1]), "{frames:?}");
        assert_eq!(countdown_frame(14, 15, 4), 0);
        assert_eq!(countdown_frame(10, 15, 4), 1);
        assert_eq!(countdown_frame(5, 15, 4), 2);
    }

    #[test]
    fn test_countdown_frame_degenerate_inputs() {
        assert_eq!(countdown_frame(3, 0, 4), 3);
        assert_eq!(countdown_frame(30, 15, 4), 0);
        assert_eq!(countdown_frame(0, 15, 0), 0);
    }
}
