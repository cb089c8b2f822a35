//! `showroom-console`: the screens of the Showroom admin console, minus
//! the rendering.
//!
//! - [`editor`]: the add/edit/delete state machine for records with media
//! - [`product`], [`gallery`], [`story`], [`team`]: the four media records
//! - [`quotes`], [`profiles`]: customer tables without media
//! - [`admins`]: the admin roster, gated by role
//! - [`session`]: the signed-in operator
//! - [`search`]: client-side search and sort

pub mod admins;
pub mod book;
pub mod editor;
pub mod gallery;
pub mod product;
pub mod profiles;
pub mod quotes;
pub mod row;
pub mod search;
pub mod session;
pub mod story;
pub mod team;

pub use admins::{Admin, AdminRoster};
pub use book::{BookEntry, TableBook};
pub use editor::{DeleteOutcome, Draft, Editor, EditorState, FormRules, MediaArity, MediaRecord};
pub use gallery::{GalleryProject, ProjectSize, ProjectType};
pub use product::Product;
pub use profiles::Profile;
pub use quotes::Quote;
pub use search::{search, ListView, Searchable, SortOrder};
pub use session::SessionContext;
pub use story::{parse_expiry, Story};
pub use team::TeamMember;

use std::sync::Arc;

use showroom_core::{RecordStore, StorageGateway};
use showroom_media::MediaCodec;

/// Wires the backend collaborators to every screen.
#[derive(Clone)]
pub struct Console {
    store: Arc<dyn RecordStore>,
    storage: Arc<dyn StorageGateway>,
    codec: MediaCodec,
    rules: FormRules,
    actor: Option<String>,
}

impl Console {
    pub fn new(store: Arc<dyn RecordStore>, storage: Arc<dyn StorageGateway>) -> Self {
        let codec = MediaCodec::new(storage.clone());
        Self {
            store,
            storage,
            codec,
            rules: FormRules::default(),
            actor: None,
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.rules.categories = categories;
        self
    }

    /// Attribute writes to the signed-in operator in the event log.
    pub fn for_session(mut self, session: &SessionContext) -> Self {
        self.actor = Some(session.actor());
        self
    }

    pub fn codec(&self) -> &MediaCodec {
        &self.codec
    }

    pub fn rules(&self) -> &FormRules {
        &self.rules
    }

    fn editor<R: MediaRecord>(&self) -> Editor<R> {
        let editor = Editor::new(
            self.store.clone(),
            self.storage.clone(),
            self.codec.clone(),
            self.rules.clone(),
        );
        match &self.actor {
            Some(actor) => editor.with_actor(actor.clone()),
            None => editor,
        }
    }

    fn book<T: BookEntry>(&self) -> TableBook<T> {
        let book = TableBook::new(self.store.clone());
        match &self.actor {
            Some(actor) => book.with_actor(actor.clone()),
            None => book,
        }
    }

    pub fn products(&self) -> Editor<Product> {
        self.editor()
    }

    pub fn gallery(&self) -> Editor<GalleryProject> {
        self.editor()
    }

    pub fn stories(&self) -> Editor<Story> {
        self.editor()
    }

    pub fn team(&self) -> Editor<TeamMember> {
        self.editor()
    }

    pub fn quotes(&self) -> TableBook<Quote> {
        self.book()
    }

    pub fn profiles(&self) -> TableBook<Profile> {
        self.book()
    }

    pub fn admins(&self) -> AdminRoster {
        AdminRoster::new(self.store.clone())
    }
}
