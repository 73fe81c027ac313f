use ratatui::style::Color;

/// A named color palette for the UI.
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub status: Color,
  pub error: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "midnight",
    bg: Color::Rgb(18, 18, 24),
    fg: Color::Rgb(220, 220, 230),
    accent: Color::Rgb(130, 170, 255),
    muted: Color::Rgb(110, 110, 130),
    border: Color::Rgb(60, 60, 80),
    status: Color::Rgb(150, 200, 150),
    error: Color::Rgb(235, 110, 110),
    highlight_fg: Color::Rgb(18, 18, 24),
    highlight_bg: Color::Rgb(130, 170, 255),
    stripe_bg: Color::Rgb(24, 24, 32),
    key_fg: Color::Rgb(18, 18, 24),
    key_bg: Color::Rgb(110, 110, 130),
  },
  Theme {
    name: "paper",
    bg: Color::Rgb(246, 242, 233),
    fg: Color::Rgb(50, 48, 44),
    accent: Color::Rgb(160, 80, 40),
    muted: Color::Rgb(150, 140, 125),
    border: Color::Rgb(200, 190, 175),
    status: Color::Rgb(90, 130, 80),
    error: Color::Rgb(180, 60, 50),
    highlight_fg: Color::Rgb(246, 242, 233),
    highlight_bg: Color::Rgb(160, 80, 40),
    stripe_bg: Color::Rgb(238, 233, 222),
    key_fg: Color::Rgb(246, 242, 233),
    key_bg: Color::Rgb(150, 140, 125),
  },
  Theme {
    name: "forest",
    bg: Color::Rgb(16, 24, 18),
    fg: Color::Rgb(210, 225, 210),
    accent: Color::Rgb(140, 200, 120),
    muted: Color::Rgb(100, 120, 100),
    border: Color::Rgb(50, 70, 55),
    status: Color::Rgb(200, 200, 120),
    error: Color::Rgb(230, 120, 100),
    highlight_fg: Color::Rgb(16, 24, 18),
    highlight_bg: Color::Rgb(140, 200, 120),
    stripe_bg: Color::Rgb(22, 32, 24),
    key_fg: Color::Rgb(16, 24, 18),
    key_bg: Color::Rgb(100, 120, 100),
  },
];
