use iced::widget::{button, column, container, text, text_input};
use iced::{Alignment, Color, Element, Length};

use crate::Message;

/// Id of the patient ID field, focused when the login screen opens
pub fn login_input_id() -> text_input::Id {
    text_input::Id::new("login-input")
}

/// Build the login screen
pub fn view<'a>(input: &'a str, error: Option<&'a str>) -> Element<'a, Message> {
    let mut form = column![
        text("Welcome to Medisetu").size(32),
        text("Access your medical reports securely").size(16),
        text_input("Enter your Patient ID", input)
            .id(login_input_id())
            .on_input(Message::LoginInputChanged)
            .on_submit(Message::LoginSubmitted)
            .padding(12)
            .size(16),
    ]
    .spacing(16)
    .max_width(380)
    .align_x(Alignment::Center);

    if let Some(error) = error {
        form = form.push(text(error).size(14).color(Color::from_rgb8(0xdc, 0x26, 0x26)));
    }

    form = form.push(
        button(text("Continue").size(16))
            .on_press(Message::LoginSubmitted)
            .padding([12, 24])
            .width(Length::Fill),
    );

    container(form)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
