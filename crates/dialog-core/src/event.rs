/// Emitted by the engine after a state transition, to be dispatched by the
/// caller *outside* the dialog-table lock (the "callback inversion" design
/// note: the engine never calls back into observer code while holding the
/// table mutex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    IncomingCall { call_id: String, from: String, to: String },
    Trying { call_id: String },
    Ringing { call_id: String },
    Connected { call_id: String },
    Ended { call_id: String },
}
