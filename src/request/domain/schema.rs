//! Static dispatch surface: request groups, methods, and their signatures.
//!
//! The table mirrors what the external schema generator produces. Every
//! method's first transported parameter is the request context, which is not
//! listed here; [`MethodSignature::params`] describes the remaining
//! positional arguments.

use super::{ParseRequestGroupError, ParseRequestMethodError};
use serde_json::Value;
use std::fmt;

/// Top-level capability group a backend may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestGroup {
    /// Key and credential inventory operations.
    Manager,
    /// Login operation approval and record metadata.
    Login,
    /// Field management during account creation.
    AccountCreation,
    /// Challenge handling during account authentication.
    AccountAuthentication,
}

impl RequestGroup {
    /// Every group, in schema order.
    pub const ALL: [Self; 4] = [
        Self::Manager,
        Self::Login,
        Self::AccountCreation,
        Self::AccountAuthentication,
    ];

    /// Returns the schema name of the group.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Login => "login",
            Self::AccountCreation => "accountCreation",
            Self::AccountAuthentication => "accountAuthentication",
        }
    }
}

impl fmt::Display for RequestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RequestGroup {
    type Error = ParseRequestGroupError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == value)
            .ok_or_else(|| ParseRequestGroupError(value.to_owned()))
    }
}

/// Methods of the `manager` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerMethod {
    /// `getSigningKey(origin) -> string`
    GetSigningKey,
    /// `getCredentialsMetadata(origin) -> number`
    GetCredentialsMetadata,
}

/// Methods of the `login` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginMethod {
    /// `approveOperation(operationId, recordId) -> boolean`
    ApproveOperation,
    /// `closeOperation(operationId, reason?) -> null`
    CloseOperation,
    /// `getRecordMetadata(recordId) -> object`
    GetRecordMetadata,
    /// `updateMetadata(recordId, metadata) -> null`
    UpdateMetadata,
}

/// Methods of the `accountCreation` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountCreationMethod {
    /// `getFields(operationId) -> array`
    GetFields,
    /// `updateField(operationId, field) -> null`
    UpdateField,
    /// `closeOperation(operationId) -> null`
    CloseOperation,
}

/// Methods of the `accountAuthentication` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountAuthenticationMethod {
    /// `getChallenge(operationId) -> object`
    GetChallenge,
    /// `approveChallenge(operationId, answer) -> boolean`
    ApproveChallenge,
    /// `closeOperation(operationId) -> null`
    CloseOperation,
}

/// A fully qualified method: group plus member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    /// A `manager` group method.
    Manager(ManagerMethod),
    /// A `login` group method.
    Login(LoginMethod),
    /// An `accountCreation` group method.
    AccountCreation(AccountCreationMethod),
    /// An `accountAuthentication` group method.
    AccountAuthentication(AccountAuthenticationMethod),
}

impl RequestMethod {
    /// Every method, in schema order.
    pub const ALL: [Self; 12] = [
        Self::Manager(ManagerMethod::GetSigningKey),
        Self::Manager(ManagerMethod::GetCredentialsMetadata),
        Self::Login(LoginMethod::ApproveOperation),
        Self::Login(LoginMethod::CloseOperation),
        Self::Login(LoginMethod::GetRecordMetadata),
        Self::Login(LoginMethod::UpdateMetadata),
        Self::AccountCreation(AccountCreationMethod::GetFields),
        Self::AccountCreation(AccountCreationMethod::UpdateField),
        Self::AccountCreation(AccountCreationMethod::CloseOperation),
        Self::AccountAuthentication(AccountAuthenticationMethod::GetChallenge),
        Self::AccountAuthentication(AccountAuthenticationMethod::ApproveChallenge),
        Self::AccountAuthentication(AccountAuthenticationMethod::CloseOperation),
    ];

    /// Looks up a method by name within a group.
    ///
    /// # Errors
    ///
    /// Returns [`ParseRequestMethodError`] when `name` is not a member of
    /// `group`.
    pub fn parse(group: RequestGroup, name: &str) -> Result<Self, ParseRequestMethodError> {
        Self::ALL
            .into_iter()
            .find(|method| method.group() == group && method.name() == name)
            .ok_or_else(|| ParseRequestMethodError {
                group: group.as_str().to_owned(),
                method: name.to_owned(),
            })
    }

    /// Returns the group this method belongs to.
    #[must_use]
    pub const fn group(self) -> RequestGroup {
        match self {
            Self::Manager(_) => RequestGroup::Manager,
            Self::Login(_) => RequestGroup::Login,
            Self::AccountCreation(_) => RequestGroup::AccountCreation,
            Self::AccountAuthentication(_) => RequestGroup::AccountAuthentication,
        }
    }

    /// Returns the schema name of the method within its group.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Manager(ManagerMethod::GetSigningKey) => "getSigningKey",
            Self::Manager(ManagerMethod::GetCredentialsMetadata) => "getCredentialsMetadata",
            Self::Login(LoginMethod::ApproveOperation) => "approveOperation",
            Self::Login(LoginMethod::CloseOperation)
            | Self::AccountCreation(AccountCreationMethod::CloseOperation)
            | Self::AccountAuthentication(AccountAuthenticationMethod::CloseOperation) => {
                "closeOperation"
            }
            Self::Login(LoginMethod::GetRecordMetadata) => "getRecordMetadata",
            Self::Login(LoginMethod::UpdateMetadata) => "updateMetadata",
            Self::AccountCreation(AccountCreationMethod::GetFields) => "getFields",
            Self::AccountCreation(AccountCreationMethod::UpdateField) => "updateField",
            Self::AccountAuthentication(AccountAuthenticationMethod::GetChallenge) => {
                "getChallenge"
            }
            Self::AccountAuthentication(AccountAuthenticationMethod::ApproveChallenge) => {
                "approveChallenge"
            }
        }
    }

    /// Returns the declared signature of the method.
    #[must_use]
    pub const fn signature(self) -> &'static MethodSignature {
        match self {
            Self::Manager(ManagerMethod::GetSigningKey) => &GET_SIGNING_KEY,
            Self::Manager(ManagerMethod::GetCredentialsMetadata) => &GET_CREDENTIALS_METADATA,
            Self::Login(LoginMethod::ApproveOperation) => &APPROVE_OPERATION,
            Self::Login(LoginMethod::CloseOperation) => &LOGIN_CLOSE_OPERATION,
            Self::Login(LoginMethod::GetRecordMetadata) => &GET_RECORD_METADATA,
            Self::Login(LoginMethod::UpdateMetadata) => &UPDATE_METADATA,
            Self::AccountCreation(AccountCreationMethod::GetFields) => &GET_FIELDS,
            Self::AccountCreation(AccountCreationMethod::UpdateField) => &UPDATE_FIELD,
            Self::AccountCreation(AccountCreationMethod::CloseOperation)
            | Self::AccountAuthentication(AccountAuthenticationMethod::CloseOperation) => {
                &CLOSE_OPERATION
            }
            Self::AccountAuthentication(AccountAuthenticationMethod::GetChallenge) => {
                &GET_CHALLENGE
            }
            Self::AccountAuthentication(AccountAuthenticationMethod::ApproveChallenge) => {
                &APPROVE_CHALLENGE
            }
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group(), self.name())
    }
}

/// Shape a transported JSON value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// JSON `null`.
    Null,
}

impl ValueShape {
    /// Returns whether `value` has this shape.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Object, Value::Object(_))
                | (Self::Array, Value::Array(_))
                | (Self::Null, Value::Null)
        )
    }

    /// Returns the shape of an arbitrary value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::Null => Self::Null,
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "a string",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::Object => "an object",
            Self::Array => "an array",
            Self::Null => "null",
        })
    }
}

/// A positional parameter after the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Schema name of the parameter.
    pub name: &'static str,
    /// Required value shape.
    pub shape: ValueShape,
    /// Whether the parameter may be omitted or `null`.
    pub optional: bool,
}

impl ParamSpec {
    const fn required(name: &'static str, shape: ValueShape) -> Self {
        Self {
            name,
            shape,
            optional: false,
        }
    }

    const fn optional(name: &'static str, shape: ValueShape) -> Self {
        Self {
            name,
            shape,
            optional: true,
        }
    }

    /// Returns whether `value` is acceptable for this parameter.
    #[must_use]
    pub const fn accepts(&self, value: &Value) -> bool {
        self.shape.accepts(value) || (self.optional && matches!(value, Value::Null))
    }
}

/// Declared parameters and result of one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSignature {
    /// Positional parameters following the request context.
    pub params: &'static [ParamSpec],
    /// Shape of the resolved value.
    pub result: ValueShape,
}

impl MethodSignature {
    /// Returns the number of parameters that must be supplied.
    #[must_use]
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|param| !param.optional).count()
    }
}

const ORIGIN: ParamSpec = ParamSpec::required("origin", ValueShape::String);
const OPERATION_ID: ParamSpec = ParamSpec::required("operationId", ValueShape::String);
const RECORD_ID: ParamSpec = ParamSpec::required("recordId", ValueShape::String);

const GET_SIGNING_KEY: MethodSignature = MethodSignature {
    params: &[ORIGIN],
    result: ValueShape::String,
};

const GET_CREDENTIALS_METADATA: MethodSignature = MethodSignature {
    params: &[ORIGIN],
    result: ValueShape::Number,
};

const APPROVE_OPERATION: MethodSignature = MethodSignature {
    params: &[OPERATION_ID, RECORD_ID],
    result: ValueShape::Boolean,
};

const LOGIN_CLOSE_OPERATION: MethodSignature = MethodSignature {
    params: &[
        OPERATION_ID,
        ParamSpec::optional("reason", ValueShape::String),
    ],
    result: ValueShape::Null,
};

const GET_RECORD_METADATA: MethodSignature = MethodSignature {
    params: &[RECORD_ID],
    result: ValueShape::Object,
};

const UPDATE_METADATA: MethodSignature = MethodSignature {
    params: &[
        RECORD_ID,
        ParamSpec::required("metadata", ValueShape::Object),
    ],
    result: ValueShape::Null,
};

const GET_FIELDS: MethodSignature = MethodSignature {
    params: &[OPERATION_ID],
    result: ValueShape::Array,
};

const UPDATE_FIELD: MethodSignature = MethodSignature {
    params: &[OPERATION_ID, ParamSpec::required("field", ValueShape::Object)],
    result: ValueShape::Null,
};

const CLOSE_OPERATION: MethodSignature = MethodSignature {
    params: &[OPERATION_ID],
    result: ValueShape::Null,
};

const GET_CHALLENGE: MethodSignature = MethodSignature {
    params: &[OPERATION_ID],
    result: ValueShape::Object,
};

const APPROVE_CHALLENGE: MethodSignature = MethodSignature {
    params: &[OPERATION_ID, ParamSpec::required("answer", ValueShape::Object)],
    result: ValueShape::Boolean,
};
