//! Unidirectional state engine for the task list screen.
//!
//! Events flow into [`TaskScreenController::send_event`], which runs the pure
//! [`reducer`] against the current [`TasksScreenState`] snapshot held by the
//! [`StateStore`]. Repository work requested by the reducer runs on the tokio
//! runtime; its outcome is folded back into whatever snapshot is current when
//! it completes, and transient notifications go out on the [`EffectChannel`].

pub mod collection;
pub mod controller;
pub mod dates;
pub mod effects;
pub mod error;
pub mod events;
pub mod http;
pub mod reducer;
pub mod repository;
pub mod state;
pub mod store;

pub use collection::{DocumentCollection, InMemoryDocumentCollection};
pub use controller::TaskScreenController;
pub use effects::{EffectChannel, EffectStream};
pub use error::{FetchResult, RepositoryError, PLEASE_CHECK_INTERNET_CONNECTION};
pub use events::{TaskScreenEffect, TaskScreenEvent};
pub use http::{HttpCollectionConfig, HttpDocumentCollection};
pub use repository::{CollectionTaskRepository, RepositoryConfig, TaskRepository};
pub use state::TasksScreenState;
pub use store::{StateStore, Subscription};
