// linemark stateful components
// The collection engine owns the bookmark/group lists; the change notifier
// is the signal presentation adapters subscribe to.

pub mod change_notifier;
pub mod collection_engine;
