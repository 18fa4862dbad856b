//! Convenience extensions over [`Result`].
//!
//! * [`DecodeJson`] / [`EncodeJson`] turn results carrying JSON bytes into
//!   typed values and back, reporting parse errors through the result itself.
//! * [`OutcomeExt`] dispatches a result to one of two handlers
//!   ([`OutcomeExt::fold`]) or hands it over to a [`Publisher`]
//!   ([`OutcomeExt::publish`]).
//! * [`AsyncOutcomeExt`] maps and chains results with asynchronous transforms.
//!
//! ```
//! use futures_executor::block_on;
//! use result_extensions::{AsyncOutcomeExt, DecodeJson, EncodeJson, OutcomeExt, PassthroughSubject};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! let subject = PassthroughSubject::<Result<User, String>>::new();
//! let _subscription = subject.subscribe(|user| {
//!     user.fold(|u| println!("got {}", u.name), |e| eprintln!("failed: {}", e))
//! });
//!
//! let raw: anyhow::Result<&[u8]> = Ok(br#"{"name": "kamil", "age": 30}"#);
//! let user = block_on(raw.decode_json::<User>().async_map(|mut user| async move {
//!     user.age += 1;
//!     user
//! }))
//! .map_err(|e| e.to_string());
//!
//! user.clone().publish(&subject);
//!
//! let json = user.map_err(anyhow::Error::msg).encode_json().unwrap();
//! assert_eq!(&json[..], br#"{"name":"kamil","age":31}"#);
//! ```

mod combinators;
mod json;
mod outcome;
mod subject;

pub use combinators::AsyncOutcomeExt;
pub use json::{DecodeJson, EncodeJson, JsonEncoder};
pub use outcome::OutcomeExt;
pub use subject::{PassthroughSubject, Publisher, Subscription};
