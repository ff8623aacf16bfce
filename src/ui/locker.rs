use iced::widget::{button, column, container, pick_list, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length, Pixels, Theme};
use iced_aw::Wrap;

use super::status_badge;
use crate::state::data::Report;
use crate::state::portal::Listing;
use crate::state::projection::{Criteria, SortOrder, StatusFilter};
use crate::Message;

const CARD_WIDTH: f32 = 300.0;
const SKELETON_CARDS: usize = 3;
const GRID_GAP: Pixels = Pixels(16.0);

/// Id of the search field, focused by the `/` shortcut
pub fn search_input_id() -> text_input::Id {
    text_input::Id::new("search-input")
}

/// Build the report locker screen
pub fn view<'a>(criteria: &'a Criteria, listing: Listing<'a>) -> Element<'a, Message> {
    let content: Column<Message> = column![
        text("My Reports").size(28),
        toolbar(criteria),
        filter_bar(criteria.status_filter),
        list_area(listing),
    ]
    .spacing(20)
    .padding(24);

    scrollable(content).height(Length::Fill).into()
}

fn toolbar(criteria: &Criteria) -> Element<'_, Message> {
    let mut search = row![text_input("Search reports... (Press '/')", &criteria.query)
        .id(search_input_id())
        .on_input(Message::SearchChanged)
        .padding(10)
        .width(Length::Fill)]
    .spacing(8)
    .align_y(Alignment::Center)
    .width(Length::Fill);

    if !criteria.query.is_empty() {
        search = search.push(
            button(text("Clear").size(14))
                .on_press(Message::ClearSearch)
                .style(button::text),
        );
    }

    row![
        search,
        pick_list(SortOrder::ALL, Some(criteria.sort_order), Message::SortSelected)
            .padding(10),
    ]
    .spacing(12)
    .align_y(Alignment::Center)
    .into()
}

fn filter_bar<'a>(active: StatusFilter) -> Element<'a, Message> {
    let buttons = StatusFilter::ALL.into_iter().map(|filter| -> Element<'a, Message> {
        let style = if filter == active {
            button::primary
        } else {
            button::secondary
        };
        button(text(filter.label()).size(14))
            .on_press(Message::FilterSelected(filter))
            .padding([6, 16])
            .style(style)
            .into()
    });

    row(buttons).spacing(8).into()
}

fn list_area(listing: Listing<'_>) -> Element<'_, Message> {
    match listing {
        Listing::Loading => {
            let skeletons: Vec<Element<'_, Message>> = (0..SKELETON_CARDS)
                .map(|_| {
                    container(text("Loading...").size(14))
                        .padding(20)
                        .width(Length::Fixed(CARD_WIDTH))
                        .height(Length::Fixed(140.0))
                        .style(container::rounded_box)
                        .into()
                })
                .collect();
            Wrap::with_elements(skeletons).spacing(GRID_GAP).line_spacing(GRID_GAP).into()
        }
        Listing::Failed => container(
            column![
                text("Could not load your reports").size(20),
                text("Check your connection and try again.").size(14),
                button(text("Retry").size(14))
                    .on_press(Message::RetryFetch)
                    .style(button::primary),
            ]
            .spacing(8)
            .align_x(Alignment::Center),
        )
        .padding(40)
        .center_x(Length::Fill)
        .into(),
        Listing::Ready([]) => container(
            column![
                text("No reports found").size(20),
                text("Try adjusting your search or filters.").size(14),
                button(text("Clear Filters").size(14))
                    .on_press(Message::ClearFilters)
                    .style(button::text),
            ]
            .spacing(8)
            .align_x(Alignment::Center),
        )
        .padding(40)
        .center_x(Length::Fill)
        .into(),
        Listing::Ready(reports) => {
            let cards: Vec<Element<'_, Message>> = reports.iter().map(report_card).collect();
            Wrap::with_elements(cards).spacing(GRID_GAP).line_spacing(GRID_GAP).into()
        }
    }
}

fn report_card(report: &Report) -> Element<'_, Message> {
    let body = column![
        row![text(&report.title).size(18).width(Length::Fill), status_badge(report.status)]
            .spacing(8)
            .align_y(Alignment::Center),
        text(&report.source).size(14),
        text(report.display_date()).size(13),
        button(text("View Report").size(14))
            .on_press(Message::OpenReport(report.id))
            .style(button::primary),
    ]
    .spacing(10);

    container(body)
        .padding(20)
        .width(Length::Fixed(CARD_WIDTH))
        .style(|theme: &Theme| container::rounded_box(theme))
        .into()
}
