use iced::widget::{button, column, container, horizontal_space, row, scrollable, text};
use iced::{Alignment, Element, Length};

use super::status_badge;
use crate::state::data::Report;
use crate::Message;

/// Build the details screen for one report
pub fn view(report: &Report) -> Element<'_, Message> {
    let size = if report.size_available() {
        report.size.as_str()
    } else {
        "Not yet available"
    };

    let download = button(text("Download").size(14))
        .on_press(Message::Download(report.file.clone()))
        .style(button::primary);

    let content = column![
        row![
            button(text("← Back to reports").size(14))
                .on_press(Message::Back)
                .style(button::text),
            horizontal_space(),
            download,
        ]
        .align_y(Alignment::Center),
        row![text(&report.title).size(28).width(Length::Fill), status_badge(report.status)]
            .spacing(12)
            .align_y(Alignment::Center),
        field("Report ID", format!("#{}", report.id)),
        field("Date", report.display_date()),
        field("Source", report.source.clone()),
        field("File", report.file.clone()),
        field("Size", size.to_string()),
        container(
            text(
                "This report contains medical terminology. Please consult with your \
                 general physician for a detailed interpretation of these results."
            )
            .size(14)
        )
        .padding(16)
        .style(container::rounded_box),
    ]
    .spacing(16)
    .padding(24)
    .max_width(760);

    scrollable(container(content).center_x(Length::Fill))
        .height(Length::Fill)
        .into()
}

fn field<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    row![
        text(label).size(14).width(Length::Fixed(120.0)),
        text(value).size(16),
    ]
    .spacing(12)
    .into()
}
