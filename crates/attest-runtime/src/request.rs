//! Request decoding
//!
//! Inbound payloads are JSON objects discriminated by `action`. They are
//! decoded once, at the boundary, into typed per-operation requests; any
//! shape problem becomes a single `MalformedRequest` error.

use attest_core::{Address, AttestError, AttestResult, ClaimId, Timestamp, PER_MILLION};
use attest_wire::Fragment;
use serde::Deserialize;
use serde_json::{Number, Value};

/// Wire shape of a request payload, before validation
#[derive(Deserialize)]
#[serde(tag = "action")]
enum RawRequest {
    #[serde(rename = "claim")]
    Claim { id: String, value: Number },
    #[serde(rename = "dispute")]
    Dispute { id: String },
    #[serde(rename = "finalize")]
    Finalize { id: String },
    #[serde(rename = "validate")]
    Validate { id: String, data: String },
    #[serde(rename = "validateChunk")]
    ValidateChunk { id: String, data: String },
    #[serde(rename = "showClaim")]
    ShowClaim { id: String },
    #[serde(rename = "showUser")]
    ShowUser { id: String },
    #[serde(rename = "getClaimList")]
    GetClaimList,
}

/// State-changing request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceRequest {
    Create { id: ClaimId, value: u64 },
    Dispute { id: ClaimId },
    Finalize { id: ClaimId },
    Validate { id: ClaimId, data: String },
    ValidateChunk { id: ClaimId, fragment: Fragment },
}

impl AdvanceRequest {
    pub fn action(&self) -> &'static str {
        match self {
            AdvanceRequest::Create { .. } => "claim",
            AdvanceRequest::Dispute { .. } => "dispute",
            AdvanceRequest::Finalize { .. } => "finalize",
            AdvanceRequest::Validate { .. } => "validate",
            AdvanceRequest::ValidateChunk { .. } => "validateChunk",
        }
    }
}

/// Read-only request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InspectRequest {
    ShowClaim { id: ClaimId },
    ShowUser { address: Address },
    ListClaims,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Advance(AdvanceRequest),
    Inspect(InspectRequest),
}

impl Request {
    /// Decode a JSON payload
    pub fn decode(payload: &[u8]) -> AttestResult<Self> {
        let raw: RawRequest = serde_json::from_slice(payload)
            .map_err(|e| AttestError::MalformedRequest(e.to_string()))?;
        Request::from_raw(raw)
    }

    /// Decode an already parsed JSON value
    pub fn from_json(value: Value) -> AttestResult<Self> {
        let raw: RawRequest = serde_json::from_value(value)
            .map_err(|e| AttestError::MalformedRequest(e.to_string()))?;
        Request::from_raw(raw)
    }

    fn from_raw(raw: RawRequest) -> AttestResult<Self> {
        let request = match raw {
            RawRequest::Claim { id, value } => Request::Advance(AdvanceRequest::Create {
                id: ClaimId::new(id)?,
                value: claim_value(&value)?,
            }),
            RawRequest::Dispute { id } => Request::Advance(AdvanceRequest::Dispute {
                id: ClaimId::new(id)?,
            }),
            RawRequest::Finalize { id } => Request::Advance(AdvanceRequest::Finalize {
                id: ClaimId::new(id)?,
            }),
            RawRequest::Validate { id, data } => {
                if data.is_empty() {
                    return Err(AttestError::MalformedRequest(
                        "you must provide string 'id' and 'data'".into(),
                    ));
                }
                Request::Advance(AdvanceRequest::Validate {
                    id: ClaimId::new(id)?,
                    data,
                })
            }
            RawRequest::ValidateChunk { id, data } => {
                let id = ClaimId::new(id)?;
                Request::Advance(AdvanceRequest::ValidateChunk {
                    id,
                    fragment: Fragment::from_hex(&data)?,
                })
            }
            RawRequest::ShowClaim { id } => Request::Inspect(InspectRequest::ShowClaim {
                id: ClaimId::new(id)?,
            }),
            RawRequest::ShowUser { id } => Request::Inspect(InspectRequest::ShowUser {
                address: Address::new(id)?,
            }),
            RawRequest::GetClaimList => Request::Inspect(InspectRequest::ListClaims),
        };
        Ok(request)
    }
}

/// Accept any JSON number holding a whole value in `0..=1_000_000`
fn claim_value(number: &Number) -> AttestResult<u64> {
    let value = match number.as_u64() {
        Some(v) => v,
        None => {
            let f = number.as_f64().unwrap_or(f64::NAN);
            if !(f.is_finite() && f >= 0.0 && f.fract() == 0.0) {
                return Err(AttestError::MalformedRequest(format!(
                    "'value' must be a non-negative integer, got {}",
                    number
                )));
            }
            if f > PER_MILLION as f64 {
                return Err(AttestError::ValueOutOfRange(f as u64));
            }
            f as u64
        }
    };
    if value > PER_MILLION {
        return Err(AttestError::ValueOutOfRange(value));
    }
    Ok(value)
}

/// One delivered input: a request plus the metadata the harness attaches
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Envelope {
    Advance {
        sender: String,
        timestamp: u64,
        payload: Value,
    },
    Inspect {
        payload: Value,
    },
}

impl Envelope {
    pub fn advance(sender: &Address, timestamp: Timestamp, payload: Value) -> Self {
        Envelope::Advance {
            sender: sender.to_string(),
            timestamp: timestamp.as_secs(),
            payload,
        }
    }

    pub fn inspect(payload: Value) -> Self {
        Envelope::Inspect { payload }
    }
}
