use crate::text_table::{Alignment, TextTableBuilder};
use splitdiary_application::ParticipantDirectory;
use splitdiary_domain::SplitState;
use splitdiary_i18n as i18n;
use std::{borrow::Cow, fmt::Write};

pub struct SplitPresenter;

impl SplitPresenter {
    /// Split editor as text: one row per participant with a lock marker on
    /// frozen rows, then the running total.
    pub fn render(state: &SplitState, directory: &dyn ParticipantDirectory) -> String {
        let headers = [
            Cow::Borrowed(i18n::PARTICIPANT),
            Cow::Borrowed(i18n::SPLIT),
            Cow::Borrowed(""),
        ];
        let mut out = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right, Alignment::Center])
            .headers(&headers)
            .rows(state.participants().iter().map(|id| {
                let name = directory
                    .display_name(id)
                    .map_or(Cow::Borrowed(id.as_str()), Cow::Borrowed);
                let marker = if state.is_frozen(id) {
                    i18n::FROZEN_MARKER
                } else {
                    ""
                };
                [
                    name,
                    Cow::Owned(format!("{}%", state.split_of(id))),
                    Cow::Borrowed(marker),
                ]
            }))
            .build();

        let _ = writeln!(&mut out, "{}", i18n::split_total(state.total()));
        out
    }
}
