use std::sync::Mutex;

type Callback<A> = Mutex<Option<Box<dyn Fn(A) + Send + Sync>>>;

/// The observable event set of §4.5, installed via `set_on_*` and invoked
/// from the receive context after the dialog-table lock has been dropped.
#[derive(Default)]
pub struct CallbackSet {
    on_incoming_call: Callback<(String, String)>,
    on_call_trying: Callback<String>,
    on_call_ringing: Callback<String>,
    on_call_connected: Callback<String>,
    on_call_ended: Callback<String>,
}

macro_rules! callback_pair {
    ($set_name:ident, $fire_name:ident, $field:ident, $arg:ty) => {
        pub fn $set_name(&self, f: impl Fn($arg) + Send + Sync + 'static) {
            *self.$field.lock().unwrap() = Some(Box::new(f));
        }

        pub fn $fire_name(&self, arg: $arg) {
            if let Some(f) = self.$field.lock().unwrap().as_ref() {
                f(arg);
            }
        }
    };
}

impl CallbackSet {
    pub fn new() -> CallbackSet {
        CallbackSet::default()
    }

    callback_pair!(set_on_incoming_call, fire_incoming_call, on_incoming_call, (String, String));
    callback_pair!(set_on_call_trying, fire_call_trying, on_call_trying, String);
    callback_pair!(set_on_call_ringing, fire_call_ringing, on_call_ringing, String);
    callback_pair!(set_on_call_connected, fire_call_connected, on_call_connected, String);
    callback_pair!(set_on_call_ended, fire_call_ended, on_call_ended, String);
}
