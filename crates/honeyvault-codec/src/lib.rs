//! IS-PMTE codec: the distribution-oracle contract (C2), interval codec
//! (C3), bit-stream seed packer (C4), end-to-end vault codec (C5), and
//! incremental appender (C8).
//!
//! This is the core of the honey-vault scheme: turning a list of passwords
//! into a seed that is statistically close to uniform under a correct key,
//! and that decodes to *some* plausible password list under any key.

pub mod appender;
pub mod bitpack;
pub mod cancel;
pub mod error;
pub mod interval;
pub mod oracle;
pub mod vault_codec;

pub use appender::append_password;
pub use cancel::{CancelToken, NeverCancel};
pub use error::CodecError;
pub use oracle::{DistributionOracle, UniformOracle, ZipfOracle};
pub use vault_codec::{decode, encode, EncodedVault, VaultCodecConfig};
