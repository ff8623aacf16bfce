/// User interface components
///
/// Each screen is a plain function from state to an `Element`; the app
/// shell picks one per render and wraps it with the toast overlay.
/// - `login.rs` - patient ID form
/// - `locker.rs` - search, filters and the report grid
/// - `details.rs` - a single report

pub mod details;
pub mod locker;
pub mod login;

use iced::widget::{button, column, container, horizontal_space, row, stack, text, vertical_space};
use iced::{Alignment, Background, Border, Color, Element, Length, Theme};

use crate::state::data::ReportStatus;
use crate::state::theme::ThemePreference;
use crate::Message;

/// Badge colours per report status: (background, text)
fn status_colors(status: ReportStatus) -> (Color, Color) {
    match status {
        ReportStatus::Normal => (Color::from_rgb8(0xdc, 0xfc, 0xe7), Color::from_rgb8(0x15, 0x80, 0x3d)),
        ReportStatus::Abnormal => (Color::from_rgb8(0xfe, 0xe2, 0xe2), Color::from_rgb8(0xb9, 0x1c, 0x1c)),
        ReportStatus::Pending => (Color::from_rgb8(0xfe, 0xf9, 0xc3), Color::from_rgb8(0xa1, 0x62, 0x07)),
        ReportStatus::Unknown => (Color::from_rgb8(0xf3, 0xf4, 0xf6), Color::from_rgb8(0x37, 0x41, 0x51)),
    }
}

/// Rounded pill showing a report status
pub fn status_badge<'a>(status: ReportStatus) -> Element<'a, Message> {
    let (background, foreground) = status_colors(status);

    container(text(status.label()).size(12).color(foreground))
        .padding([2, 10])
        .style(move |_theme: &Theme| container::Style {
            background: Some(Background::Color(background)),
            border: Border {
                radius: 12.0.into(),
                width: 1.0,
                color: Color { a: 0.3, ..foreground },
            },
            ..Default::default()
        })
        .into()
}

/// Top bar with the app title, theme toggle and optional logout
pub fn header<'a>(theme: ThemePreference, patient: Option<&'a str>) -> Element<'a, Message> {
    let theme_label = match theme {
        ThemePreference::Light => "Dark mode",
        ThemePreference::Dark => "Light mode",
    };

    let title = button(text("Medisetu").size(24)).style(button::text);
    let title = match patient {
        Some(_) => title.on_press(Message::ShowLocker),
        None => title,
    };

    let mut bar = row![
        title,
        horizontal_space(),
        button(text(theme_label).size(14))
            .on_press(Message::ToggleTheme)
            .style(button::secondary),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    if let Some(patient) = patient {
        bar = bar
            .push(text(format!("Patient {patient}")).size(14))
            .push(
                button(text("Logout").size(14))
                    .on_press(Message::Logout)
                    .style(button::danger),
            );
    }

    container(bar).padding([12, 24]).width(Length::Fill).into()
}

/// Overlay a toast message at the bottom of `content`
pub fn with_toast<'a>(content: Element<'a, Message>, toast: Option<&'a str>) -> Element<'a, Message> {
    let Some(message) = toast else {
        return content;
    };

    let bubble = container(text(message).size(14).color(Color::WHITE))
        .padding([10, 18])
        .style(|_theme: &Theme| container::Style {
            background: Some(Background::Color(Color::from_rgb8(0x1f, 0x29, 0x37))),
            border: Border {
                radius: 8.0.into(),
                ..Default::default()
            },
            ..Default::default()
        });

    let overlay = column![
        vertical_space(),
        row![horizontal_space(), bubble, horizontal_space()],
    ]
    .padding(24)
    .width(Length::Fill)
    .height(Length::Fill);

    stack![content, overlay].into()
}
