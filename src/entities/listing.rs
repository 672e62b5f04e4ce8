//! A small capability shared by every entity the shell can list by id and name.

use uuid::Uuid;

use super::{developer, game, genre, platform, user};

/// Anything that has a stable identity and a human-facing name.
pub trait Listing {
    fn id(&self) -> Uuid;
    fn display_name(&self) -> &str;
}

impl Listing for genre::Model {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Listing for platform::Model {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Listing for developer::Model {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Listing for game::Model {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Listing for user::Model {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.username
    }
}

/// Render one `<id>  <name>` line per item, in the order given.
pub fn render_listing<T: Listing>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .map(|item| format!("{}  {}", item.id(), item.display_name()))
        .collect()
}

/// Names of the given items, in order.
pub fn display_names<T: Listing>(items: &[T]) -> Vec<&str> {
    items.iter().map(Listing::display_name).collect()
}
