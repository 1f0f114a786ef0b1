//! Deferred two-phase signing of data items.
//!
//! ```text
//! Initialized -> AwaitingAuthority -> ConstructionRequested
//!     -> PassthroughComplete ----------------------------> Finalized
//!     -> SignatureReceived -> Verified ------------------> Finalized
//!                          -> VerificationFailed
//! AwaitingAuthority -> ConstructionNeverInvoked
//! ```
//!
//! The authority only ever signs the deep hash. The unsigned bytes are built
//! inside the construction callback; the authority may call it more than
//! once, and only the last call counts. Once the authority settles, the last
//! build is handed over through a single-resolution cell, the returned
//! signature is injected at
//! [`SIGNATURE_OFFSET`](hbconnect_core::SIGNATURE_OFFSET), the item is
//! verified, and the content ID derived.

use hbconnect_core::{
    inject_signature, unsigned_bytes, DataItem, Envelope, ItemId, SignedDataItem,
};
use tracing::debug;

use crate::authority::{
    AuthorityOutput, ConstructData, Constructed, ConstructionRequest, SignerKind,
    SigningAuthority,
};
use crate::deferred::deferred;
use crate::error::{Result, SignerError};

/// Where a signing run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningState {
    Initialized,
    AwaitingAuthority,
    ConstructionRequested,
    PassthroughComplete,
    SignatureReceived,
    Verified,
    Finalized,
    ConstructionNeverInvoked,
    VerificationFailed,
}

impl SigningState {
    /// True if `next` is a legal successor.
    pub fn can_transition_to(self, next: SigningState) -> bool {
        use SigningState::*;
        matches!(
            (self, next),
            (Initialized, AwaitingAuthority)
                | (AwaitingAuthority, ConstructionRequested)
                | (AwaitingAuthority, ConstructionNeverInvoked)
                | (ConstructionRequested, PassthroughComplete)
                | (ConstructionRequested, SignatureReceived)
                | (SignatureReceived, Verified)
                | (SignatureReceived, VerificationFailed)
                | (PassthroughComplete, Finalized)
                | (Verified, Finalized)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SigningState::Finalized
                | SigningState::ConstructionNeverInvoked
                | SigningState::VerificationFailed
        )
    }
}

fn transition(state: &mut SigningState, next: SigningState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal signing transition {state:?} -> {next:?}"
    );
    debug!(from = ?state, to = ?next, "signing state");
    *state = next;
}

/// Signs envelopes through a [`SigningAuthority`].
#[derive(Debug, Clone)]
pub struct DataItemSigner<A> {
    authority: A,
    kind: SignerKind,
}

impl<A: SigningAuthority> DataItemSigner<A> {
    /// Signer using the envelope kind.
    pub fn new(authority: A) -> Self {
        Self {
            authority,
            kind: SignerKind::Envelope,
        }
    }

    pub fn with_kind(mut self, kind: SignerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> SignerKind {
        self.kind
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Sign `envelope`, returning the signed item and its content ID.
    pub async fn sign(&self, envelope: Envelope) -> Result<SignedDataItem> {
        let mut state = SigningState::Initialized;
        let (mut resolver, unsigned) = deferred::<Vec<u8>>();
        let mut construction = Construction {
            envelope,
            built: None,
            invoked: false,
            state: SigningState::AwaitingAuthority,
        };

        transition(&mut state, SigningState::AwaitingAuthority);
        let output = self.authority.sign(&mut construction, self.kind).await;

        let Construction {
            invoked,
            built,
            state: construction_state,
            ..
        } = construction;
        if let Some(bytes) = built {
            resolver.resolve(bytes)?;
        }
        // An unresolved cell now reports `None` instead of waiting forever.
        drop(resolver);
        let output = output?;

        if !invoked {
            transition(&mut state, SigningState::ConstructionNeverInvoked);
            return Err(SignerError::ConstructionNeverInvoked);
        }
        transition(&mut state, construction_state);

        let signature = match output {
            AuthorityOutput::Signed(item) => {
                transition(&mut state, SigningState::PassthroughComplete);
                transition(&mut state, SigningState::Finalized);
                return Ok(item);
            }
            AuthorityOutput::Signature { signature, .. } if !signature.is_empty() => signature,
            AuthorityOutput::Signature { .. } => return Err(SignerError::MissingSignature),
        };
        transition(&mut state, SigningState::SignatureReceived);

        let mut bytes = unsigned
            .wait()
            .await
            .ok_or(SignerError::UnsignedDataUnavailable)?;

        let verified = inject_signature(&mut bytes, &signature)
            .map_err(SignerError::from)
            .and_then(|()| {
                DataItem::parse(&bytes)?
                    .verify()
                    .map_err(|_| SignerError::InvalidSignature)
            });
        if let Err(e) = verified {
            debug!(error = %e, "signature rejected");
            transition(&mut state, SigningState::VerificationFailed);
            return Err(SignerError::InvalidSignature);
        }
        transition(&mut state, SigningState::Verified);

        let id = ItemId::from_signature(&signature);
        transition(&mut state, SigningState::Finalized);
        debug!(%id, len = bytes.len(), "data item signed");

        Ok(SignedDataItem {
            id,
            raw: bytes.into(),
        })
    }
}

/// The construction callback for one signing run.
struct Construction {
    envelope: Envelope,
    /// Unsigned bytes from the most recent signing construction.
    built: Option<Vec<u8>>,
    invoked: bool,
    state: SigningState,
}

impl ConstructData for Construction {
    fn construct(&mut self, request: ConstructionRequest) -> Result<Constructed> {
        self.invoked = true;
        self.state = SigningState::ConstructionRequested;

        let identity = match request {
            ConstructionRequest::Passthrough => {
                debug!("construction: passthrough");
                self.built = None;
                return Ok(Constructed::Fields(self.envelope.clone()));
            }
            ConstructionRequest::Sign(identity) => identity,
        };

        let signature_type = identity.signature_type.unwrap_or_default();
        debug!(
            %signature_type,
            algorithm = identity.algorithm(),
            address = identity.address.as_deref(),
            "construction: building unsigned item"
        );

        let bytes = unsigned_bytes(&self.envelope, signature_type, &identity.public_key)?;
        let hash = DataItem::parse(&bytes)?.signature_data();

        if self.built.replace(bytes).is_some() {
            debug!("construction: replacing previous build");
        }

        Ok(Constructed::SignatureData(hash))
    }
}
