use chrono::{DateTime, Local, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::models::PurchaseStatus;
use crate::storage::Theme;

/// Colors of one theme
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub accent: Color,
    pub accent_alt: Color,
    pub text: Color,
    pub muted: Color,
    pub highlight: Color,
    pub popup_bg: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::PinkDark => Palette {
            accent: Color::Rgb(236, 72, 153),
            accent_alt: Color::Rgb(244, 114, 182),
            text: Color::White,
            muted: Color::DarkGray,
            highlight: Color::Rgb(253, 224, 71),
            popup_bg: Color::Black,
        },
        Theme::PinkLight => Palette {
            accent: Color::Rgb(219, 39, 119),
            accent_alt: Color::Rgb(190, 24, 93),
            text: Color::Black,
            muted: Color::Gray,
            highlight: Color::Rgb(124, 58, 237),
            popup_bg: Color::Rgb(253, 242, 248),
        },
        Theme::DarkBlue => Palette {
            accent: Color::Cyan,
            accent_alt: Color::Blue,
            text: Color::White,
            muted: Color::DarkGray,
            highlight: Color::Yellow,
            popup_bg: Color::Black,
        },
    }
}

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize, palette: &Palette) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(palette.muted))
        .highlight_style(Style::default().fg(palette.accent).bold())
        .divider("|")
}

/// Renders a labelled text input
pub fn render_input<'a>(content: &'a str, title: &'a str, is_focused: bool, palette: &Palette) -> Paragraph<'a> {
    let style = if is_focused {
        Style::default().fg(palette.highlight)
    } else {
        Style::default().fg(palette.muted)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title);

    Paragraph::new(content).block(block)
}

/// Purchase status color
pub fn status_color(status: &PurchaseStatus) -> Color {
    match status {
        PurchaseStatus::Pendente => Color::Yellow,
        PurchaseStatus::Pago => Color::Green,
        PurchaseStatus::AguardandoEtiqueta => Color::Magenta,
        PurchaseStatus::EtiquetaGerada => Color::Cyan,
        PurchaseStatus::Postado => Color::Blue,
        PurchaseStatus::Entregue => Color::LightGreen,
        PurchaseStatus::Cancelado => Color::Red,
        PurchaseStatus::Other(_) => Color::Gray,
    }
}

/// Brazilian currency: `R$ 1.234,56`
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

/// Local `dd/mm/yyyy HH:MM`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

/// Center a popup inside `r`
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(12.5), "R$ 12,50");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(1234.567), "R$ 1.234,57");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_brl(-3.2), "-R$ 3,20");
    }

    #[test]
    fn test_status_colors_distinguish_cancelled() {
        assert_eq!(status_color(&PurchaseStatus::Cancelado), Color::Red);
        assert_eq!(status_color(&PurchaseStatus::from("Cancelada")), Color::Red);
        assert_ne!(status_color(&PurchaseStatus::Pago), Color::Red);
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 40, outer);
        assert!((59..=61).contains(&inner.width));
        assert!((19..=21).contains(&inner.height));
        assert!(inner.right() <= outer.right() && inner.bottom() <= outer.bottom());
    }
}
