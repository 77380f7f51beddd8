pub mod call_record_store;
pub mod caller;
pub mod dispatcher;

pub use call_record_store::{
    CallRecordStore,
    CallRecordStoreError,
    SqlCallRecordStore,
};
pub use caller::{CallInitiator, CallInitiatorError, HttpCallInitiator};
pub use dispatcher::{BatchDispatcher, DispatchError};
