use crate::client::Email;

use super::GameRecord;

const DATE_FORMAT: &str = "%B %-d, %Y";

/// Render the announcement email for a newly free game
pub fn render(game: &GameRecord) -> Email {
    let start = game.start_date.format(DATE_FORMAT);
    let end = game.end_date.format(DATE_FORMAT);

    let subject = format!("{} is free right now!", game.title);
    let html_body = format!(
        "<h1>{}</h1><p>This week's free game is <strong>{}</strong>.</p><p>Claim it between {} and {}.</p>",
        game.title, game.title, start, end
    );
    let text_body = format!(
        "This week's free game is {}.\n\nClaim it between {} and {}.",
        game.title, start, end
    );

    Email {
        subject,
        html_body,
        text_body,
    }
}
