#![warn(clippy::uninlined_format_args)]

mod bootstrap;

use bootstrap::{LedgerConfig, init_logging};
use splitdiary_application::{DiaryId, LedgerProcessor};
use splitdiary_domain::ParticipantId;
use splitdiary_i18n as i18n;
use splitdiary_infrastructure::{GreedySettlementOptimizer, JsonDiaryRepository};
use splitdiary_presentation::{ExpensePresenter, SettlementPresenter};
use std::{borrow::Cow, env, path::Path, process};

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let mut args = env::args().skip(1);
    let Some(target) = args.next() else {
        return Err(i18n::USAGE.into());
    };
    let participant = args.next().map(ParticipantId::new);

    let config = LedgerConfig::from_env();
    let (repository, diary_id) = locate_diary(&target, &config);
    tracing::debug!(
        root = %repository.root().display(),
        diary_id = %diary_id,
        "loading diary"
    );

    let optimizer = GreedySettlementOptimizer;
    let processor = LedgerProcessor::new(&repository, &optimizer);
    let snapshot = processor
        .load(&diary_id)
        .map_err(|err| Cow::Owned(err.to_string()))?;

    if snapshot.skipped.total() > 0 {
        eprintln!(
            "{}",
            i18n::skipped_records(snapshot.skipped.expenses, snapshot.skipped.settlements)
        );
    }

    if let Some(id) = &participant
        && !snapshot.participants.contains(id)
    {
        return Err(i18n::unknown_participant(id).into());
    }

    let summary = processor.summarize(&snapshot);

    if !snapshot.name.is_empty() {
        println!("{}\n", snapshot.name);
    }
    print!(
        "{}",
        ExpensePresenter::render(&snapshot, participant.as_ref(), &config.currency)
    );
    println!(
        "\n{}",
        SettlementPresenter::render(&summary, &snapshot, &config.currency)
    );
    print!(
        "{}",
        SettlementPresenter::render_history(&snapshot.settlements, &snapshot, &config.currency)
    );

    if let Some(id) = participant {
        let position = processor.position_of(&summary, &id);
        println!(
            "{}",
            SettlementPresenter::render_position(
                &id,
                &position,
                &summary.instructions,
                &snapshot,
                &config.currency,
            )
        );
        let check = processor.leave_check(&snapshot, &summary, &id);
        print!(
            "{}",
            SettlementPresenter::render_leave_check(&id, &check, &snapshot, &config.currency)
        );
    }

    Ok(())
}

/// A `.json` path is read in place; anything else is a diary id under the
/// configured data directory.
fn locate_diary(target: &str, config: &LedgerConfig) -> (JsonDiaryRepository, DiaryId) {
    let path = Path::new(target);
    let is_file = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    if is_file && let Some(stem) = path.file_stem() {
        let root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        return (
            JsonDiaryRepository::new(root),
            DiaryId::new(stem.to_string_lossy()),
        );
    }

    (
        JsonDiaryRepository::new(config.data_dir.clone()),
        DiaryId::new(target),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn config() -> LedgerConfig {
        LedgerConfig {
            currency: "₹".to_owned(),
            data_dir: PathBuf::from("/srv/diaries"),
        }
    }

    #[rstest]
    #[case::relative_file("trip.json", ".", "trip")]
    #[case::nested_file("data/goa.JSON", "data", "goa")]
    #[case::bare_id("weekend", "/srv/diaries", "weekend")]
    fn locates_diary(#[case] target: &str, #[case] root: &str, #[case] id: &str) {
        let (repository, diary_id) = locate_diary(target, &config());
        assert_eq!(repository.root(), Path::new(root));
        assert_eq!(diary_id, DiaryId::new(id));
    }
}
