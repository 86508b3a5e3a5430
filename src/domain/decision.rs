use super::GameRecord;

/// What to do after comparing the latest catalog game with the last announced one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NoAction,
    Notify(GameRecord),
}

/// Decide whether the latest free game should be persisted and announced.
///
/// Games are compared by title only, so a re-listed promotion with shifted
/// dates is not announced twice.
pub fn decide(latest: Option<&GameRecord>, last_recorded: Option<&GameRecord>) -> Action {
    match (latest, last_recorded) {
        (None, _) => Action::NoAction,
        (Some(latest), Some(last)) if latest.same_game(last) => Action::NoAction,
        (Some(latest), _) => Action::Notify(latest.clone()),
    }
}
