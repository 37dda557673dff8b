//! Error types, Ledger status word mapping and device diagnostic lookup.

use thiserror::Error;

use crate::types::VersionInfo;

/// Raw status words returned by the Ledger device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum StatusWord {
    Ok = 0x9000,
    DeviceLocked = 0x5515,
    ExecutionError = 0x6400,
    WrongLength = 0x6700,
    EmptyBuffer = 0x6982,
    OutputBufferTooSmall = 0x6983,
    DataInvalid = 0x6984,
    ConditionsNotSatisfied = 0x6985,
    CommandNotAllowed = 0x6986,
    BadKeyHandle = 0x6A80,
    InvalidP1P2 = 0x6B00,
    InsNotSupported = 0x6D00,
    ClaNotSupported = 0x6E00,
    Unknown = 0x6F00,
    SignVerifyError = 0x6F01,
}

const STATUS_WORDS: &[(StatusWord, &str)] = &[
    (StatusWord::Ok, "no errors"),
    (StatusWord::DeviceLocked, "device is locked"),
    (StatusWord::ExecutionError, "execution error"),
    (StatusWord::WrongLength, "wrong length"),
    (StatusWord::EmptyBuffer, "empty buffer"),
    (StatusWord::OutputBufferTooSmall, "output buffer too small"),
    (
        StatusWord::DataInvalid,
        "referenced data reversibly blocked (invalidated)",
    ),
    (StatusWord::ConditionsNotSatisfied, "conditions not satisfied"),
    (StatusWord::CommandNotAllowed, "transaction rejected"),
    (
        StatusWord::BadKeyHandle,
        "the parameters in the data field are incorrect",
    ),
    (StatusWord::InvalidP1P2, "invalid P1/P2"),
    (StatusWord::InsNotSupported, "instruction not supported"),
    (StatusWord::ClaNotSupported, "class not supported"),
    (StatusWord::Unknown, "unknown error"),
    (StatusWord::SignVerifyError, "sign/verify error"),
];

impl StatusWord {
    pub(crate) fn is_success(code: u16) -> bool {
        code == Self::Ok as u16
    }

    pub fn description(code: u16) -> &'static str {
        STATUS_WORDS
            .iter()
            .find(|(sw, _)| *sw as u16 == code)
            .map(|(_, desc)| *desc)
            .unwrap_or("unknown")
    }
}

/// Errors returned by the library.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("device returned status 0x{0:04X}: {1}")]
    DeviceStatus(u16, &'static str),

    #[error("no Ledger device found — is it plugged in?")]
    NoDeviceFound,

    #[error("could not connect to Ledger device: {0}")]
    ConnectFailure(#[source] TransportError),

    #[error("Cosmos app is not open — open it and try again")]
    AppNotOpen,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("app major version {0} is not supported")]
    UnsupportedAppVersion(u8),

    #[error("app version {found} is too old — version {required} or newer is required")]
    VersionTooOld {
        required: VersionInfo,
        found: VersionInfo,
    },

    #[error("invalid HRP: {0}")]
    InvalidHrp(String),

    #[error("invalid BIP32 path: {0}")]
    InvalidPath(String),

    #[error("not enough tokens were provided")]
    InsufficientTokens,

    #[error("unexpected character in JSON string")]
    UnexpectedCharacterInJson,

    #[error("the JSON string is not complete")]
    IncompleteJson,

    #[error("device error: {0}")]
    Device(String),

    #[error("payload of {0} bytes is too large")]
    PayloadTooLarge(usize),

    #[error("invalid protocol configuration: {0}")]
    InvalidConfig(String),
}

impl LedgerError {
    pub fn from_status(code: u16) -> Self {
        Self::DeviceStatus(code, StatusWord::description(code))
    }
}

/// JSON parser diagnostics the app reports in the body of a failed sign frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserDiagnostic {
    NoMem,
    Inval,
    Part,
}

const PARSER_DIAGNOSTICS: &[(&[u8], ParserDiagnostic)] = &[
    (b"ERROR: JSMN_ERROR_NOMEM", ParserDiagnostic::NoMem),
    (b"PARSER ERROR: JSMN_ERROR_INVAL", ParserDiagnostic::Inval),
    (b"PARSER ERROR: JSMN_ERROR_PART", ParserDiagnostic::Part),
];

impl From<ParserDiagnostic> for LedgerError {
    fn from(diag: ParserDiagnostic) -> Self {
        match diag {
            ParserDiagnostic::NoMem => Self::InsufficientTokens,
            ParserDiagnostic::Inval => Self::UnexpectedCharacterInJson,
            ParserDiagnostic::Part => Self::IncompleteJson,
        }
    }
}

/// How the response body of a failed exchange is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyRule {
    /// Look the body up in the parser diagnostic table, fall back to the raw message.
    ParserDiagnostic,
    /// Surface the body verbatim as a device message.
    Message,
}

/// Translate a failed exchange using a `(status word, rule)` table.
/// Codes missing from the table fall through to [`LedgerError::from_status`].
pub(crate) fn classify(rules: &[(u16, BodyRule)], code: u16, body: &[u8]) -> LedgerError {
    let Some((_, rule)) = rules.iter().find(|(sw, _)| *sw == code) else {
        return LedgerError::from_status(code);
    };

    let translated = match rule {
        BodyRule::ParserDiagnostic => PARSER_DIAGNOSTICS
            .iter()
            .find(|(msg, _)| *msg == body)
            .map(|(_, diag)| LedgerError::from(*diag))
            .unwrap_or_else(|| device_message(body)),
        BodyRule::Message => device_message(body),
    };
    log::warn!("device reported 0x{code:04X}: {translated}");
    translated
}

fn device_message(body: &[u8]) -> LedgerError {
    LedgerError::Device(String::from_utf8_lossy(body).into_owned())
}

/// Transport-level errors (USB, TCP, IO).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no Ledger device found — is it plugged in?")]
    DeviceNotFound,

    #[error("communication error: {0}")]
    Comm(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("device timed out after {0}ms")]
    Timeout(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
