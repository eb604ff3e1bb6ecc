pub mod signature;

pub use signature::{
    NONCE_HEADER, SIGNATURE_HEADER, SignedHeaders, TIMESTAMP_HEADER, generate_signature,
    is_fresh, sign_request, verify_signature,
};
