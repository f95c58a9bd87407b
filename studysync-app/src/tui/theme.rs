use ratatui::style::{Color, Style, Stylize};
use studysync_core::{BannerKind, Theme};

#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
    pub selected: Color,
    pub success: Color,
    pub error: Color,
    pub info: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            muted: Color::DarkGray,
            selected: Color::Magenta,
            success: Color::Green,
            error: Color::Red,
            info: Color::Blue,
        },
        Theme::Dark => Palette {
            fg: Color::Gray,
            bg: Color::Black,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selected: Color::Yellow,
            success: Color::LightGreen,
            error: Color::LightRed,
            info: Color::LightBlue,
        },
    }
}

impl Palette {
    pub fn base(&self) -> Style { Style::default().fg(self.fg).bg(self.bg) }
    pub fn title(&self) -> Style { Style::default().fg(self.accent).bold() }
    pub fn hint(&self) -> Style { Style::default().fg(self.muted) }
    pub fn selected(&self) -> Style { Style::default().fg(self.selected).bold() }
    pub fn footer(&self) -> Style { Style::default().fg(self.muted) }

    pub fn banner(&self, kind: BannerKind) -> Style {
        let c = match kind {
            BannerKind::Success => self.success,
            BannerKind::Error => self.error,
            BannerKind::Info => self.info,
        };
        Style::default().fg(c).bold()
    }
}
