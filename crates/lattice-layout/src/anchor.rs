//! Nine-way anchors shared by the grid and partitioned engines.
//!
//! Both [`GridAnchor`] and [`PartitionAlignment`] are the cross product of a
//! horizontal and a vertical [`Third`]. Each variant indexes a constant table
//! of `(horizontal, vertical)` thirds, so placement code never branches on the
//! nine names directly.

/// One third of an axis: the near edge, the middle, or the far edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Third {
    Start,
    Center,
    End,
}

impl Third {
    /// Place `size` inside `[start, start + extent)`.
    ///
    /// `Start` is flush with `start`, `End` is flush with the far edge and
    /// `Center` splits the slack, rounding each half toward zero.
    #[inline]
    pub const fn align(self, start: i32, extent: i32, size: i32) -> i32 {
        match self {
            Third::Start => start,
            Third::Center => start + extent / 2 - size / 2,
            Third::End => start + extent - size,
        }
    }

    /// Signed shift applied to an already-centered position.
    ///
    /// `free` is the slack left in the cell. The shift is `free / 2` toward
    /// the anchored edge, so with odd slack the far edge keeps one pixel.
    #[inline]
    pub const fn shift_from_center(self, free: i32) -> i32 {
        match self {
            Third::Start => -(free / 2),
            Third::Center => 0,
            Third::End => free / 2,
        }
    }
}

pub(crate) fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

/// Text conversions for an enum exposing `ALL` and `as_str`.
macro_rules! text_enum {
    ($name:ident, $kind:literal) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::LayoutError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = $crate::anchor::normalize(s);
                Self::ALL
                    .into_iter()
                    .find(|variant| variant.as_str() == wanted)
                    .ok_or_else(|| $crate::LayoutError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::LayoutError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub(crate) use text_enum;

macro_rules! nine_way {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, default = $default:ident;
        $($variant:ident => ($h:ident, $v:ident, $label:literal)),+ $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(try_from = "String"))]
        #[repr(u8)]
        pub enum $name {
            $(
                #[doc = concat!("`", $label, "`")]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in table order.
            pub const ALL: [Self; 9] = [$(Self::$variant),+];

            const THIRDS: [(Third, Third); 9] = [$((Third::$h, Third::$v)),+];

            const LABELS: [&'static str; 9] = [$($label),+];

            /// `(horizontal, vertical)` thirds for this anchor.
            #[inline]
            pub const fn thirds(self) -> (Third, Third) {
                Self::THIRDS[self as usize]
            }

            #[inline]
            pub const fn horizontal(self) -> Third {
                self.thirds().0
            }

            #[inline]
            pub const fn vertical(self) -> Third {
                self.thirds().1
            }

            /// Canonical kebab-case label.
            #[inline]
            pub const fn as_str(self) -> &'static str {
                Self::LABELS[self as usize]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        text_enum!($name, $kind);
    };
}

nine_way! {
    /// Where an undersized element sits inside its grid cell.
    GridAnchor, "grid anchor", default = MiddleCenter;
    TopLeft => (Start, Start, "top-left"),
    TopCenter => (Center, Start, "top-center"),
    TopRight => (End, Start, "top-right"),
    MiddleLeft => (Start, Center, "middle-left"),
    MiddleCenter => (Center, Center, "middle-center"),
    MiddleRight => (End, Center, "middle-right"),
    BottomLeft => (Start, End, "bottom-left"),
    BottomCenter => (Center, End, "bottom-center"),
    BottomRight => (End, End, "bottom-right"),
}

nine_way! {
    /// Where an element sits inside its partition band.
    PartitionAlignment, "partition alignment", default = Center;
    TopLeft => (Start, Start, "top-left"),
    Top => (Center, Start, "top"),
    TopRight => (End, Start, "top-right"),
    Left => (Start, Center, "left"),
    Center => (Center, Center, "center"),
    Right => (End, Center, "right"),
    BottomLeft => (Start, End, "bottom-left"),
    Bottom => (Center, End, "bottom"),
    BottomRight => (End, End, "bottom-right"),
}
