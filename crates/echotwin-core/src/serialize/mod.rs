//! On-disk formats.
//!
//! - [`npy`] - spectrogram and pitch arrays (`.npy`)
//! - [`embedding`] - speaker embeddings (`.vec`): u32 count + f32 payload
//!
//! Writers go through [`atomic`], so a failed write never leaves a
//! half-written file under the target name.

pub mod atomic;
pub mod embedding;
pub mod npy;

pub use embedding::{decode_embedding, encode_embedding, load_embedding, save_embedding};
pub use npy::{
    decode_array, decode_matrix, decode_vector, encode_matrix, encode_vector, load_array,
    load_matrix, load_vector, save_matrix, save_vector, NpyArray, NpyHeader,
};
