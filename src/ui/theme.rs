use ratatui::style::Color;

// Dark surfaces with a single orange accent. New roles go here rather than inline in the views.
pub const FG: Color = Color::Rgb(229, 231, 235);
pub const MUTED: Color = Color::Rgb(156, 163, 175);
pub const DIM: Color = Color::Rgb(107, 114, 128);
pub const BORDER: Color = Color::Rgb(55, 65, 81);
pub const BORDER_FOCUSED: Color = Color::Rgb(120, 130, 148);

pub const ACCENT: Color = Color::Rgb(255, 159, 26);
pub const ACCENT_BG: Color = Color::Rgb(44, 32, 16);
pub const SELECTED_BG: Color = Color::Rgb(23, 28, 36);

pub const ERROR: Color = Color::Rgb(248, 113, 113); // soft red

// One badge color per profile image, in pool order.
pub const AVATAR_COLORS: [Color; 4] = [
    Color::Rgb(96, 165, 250),
    Color::Rgb(134, 239, 172),
    Color::Rgb(244, 114, 182),
    Color::Rgb(253, 224, 71),
];
