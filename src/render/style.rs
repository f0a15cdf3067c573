//! Group colour scheme for graph nodes.

use crate::model::NodeGroup;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(0x55, 0x55, 0x55);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupColors {
    pub background: Color,
    pub border: Color,
    /// Used for both hover and selection.
    pub highlight_background: Color,
    pub highlight_border: Color,
}

impl GroupColors {
    const fn pastel(background: Color, highlight: Color) -> Self {
        Self {
            background,
            border: Color::GRAY,
            highlight_background: highlight,
            highlight_border: Color::BLACK,
        }
    }
}

/// Per-group colours handed to the render surface with every scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStyle {
    pub jar: GroupColors,
    pub dir: GroupColors,
    pub package: GroupColors,
    pub class: GroupColors,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            jar: GroupColors::pastel(Color::rgb(0xe7, 0xa5, 0xab), Color::rgb(0xeb, 0xb5, 0xba)),
            dir: GroupColors::pastel(Color::rgb(0xaf, 0xd6, 0xe7), Color::rgb(0xdb, 0xec, 0xf4)),
            package: GroupColors::pastel(
                Color::rgb(0xae, 0xc4, 0x89),
                Color::rgb(0xd2, 0xde, 0xbe),
            ),
            class: GroupColors::pastel(Color::rgb(0xff, 0xed, 0x9e), Color::rgb(0xff, 0xf5, 0xca)),
        }
    }
}

impl GraphStyle {
    pub fn for_group(&self, group: NodeGroup) -> &GroupColors {
        match group {
            NodeGroup::Jar => &self.jar,
            NodeGroup::Dir => &self.dir,
            NodeGroup::Package => &self.package,
            NodeGroup::Class => &self.class,
        }
    }

    pub fn for_group_mut(&mut self, group: NodeGroup) -> &mut GroupColors {
        match group {
            NodeGroup::Jar => &mut self.jar,
            NodeGroup::Dir => &mut self.dir,
            NodeGroup::Package => &mut self.package,
            NodeGroup::Class => &mut self.class,
        }
    }
}
