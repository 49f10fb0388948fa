//! Saved catalog filters.

use till_register::notice::Notice;
use till_register::session::SalesSession;
use till_register::storage::KeyValueStore;

use crate::output;

pub fn search<S: KeyValueStore>(session: &mut SalesSession<S>, text: String) {
    session.set_search(text);
    let message = if session.search().is_empty() {
        "Search cleared.".to_string()
    } else {
        format!("Searching for \"{}\".", session.search())
    };
    output::notice(&Notice::info(message));
}

pub fn category<S: KeyValueStore>(session: &mut SalesSession<S>, name: Option<String>) {
    if let Some(name) = name.as_deref()
        && !session.catalog().categories().contains(&name)
    {
        output::notice(&Notice::info(format!("No products in category \"{name}\".")));
    }
    session.set_category(name);
    let message = session.category().map_or_else(
        || "Showing all categories.".to_string(),
        |category| format!("Showing category \"{category}\"."),
    );
    output::notice(&Notice::info(message));
}
