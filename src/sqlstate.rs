//! SQLSTATE code lookup.
//!
//! <https://www.postgresql.org/docs/current/errcodes-appendix.html>

/// Resolve a 5-character SQLSTATE code to its condition name.
///
/// Unmapped codes resolve to `None`; the raw code is always available on the
/// error itself.
pub fn condition_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "00000" => "SuccessfulCompletion",
        "01000" => "Warning",
        "02000" => "NoData",
        "03000" => "SqlStatementNotYetComplete",
        "08000" => "ConnectionException",
        "08003" => "ConnectionDoesNotExist",
        "08006" => "ConnectionFailure",
        "08001" => "SqlclientUnableToEstablishSqlconnection",
        "08004" => "SqlserverRejectedEstablishmentOfSqlconnection",
        "08P01" => "ProtocolViolation",
        "09000" => "TriggeredActionException",
        "0A000" => "FeatureNotSupported",
        "0B000" => "InvalidTransactionInitiation",
        "0F000" => "LocatorException",
        "0L000" => "InvalidGrantor",
        "0P000" => "InvalidRoleSpecification",
        "21000" => "CardinalityViolation",
        "22000" => "DataException",
        "22001" => "StringDataRightTruncation",
        "22003" => "NumericValueOutOfRange",
        "22004" => "NullValueNotAllowed",
        "22007" => "InvalidDatetimeFormat",
        "22008" => "DatetimeFieldOverflow",
        "2200B" => "EscapeCharacterConflict",
        "22012" => "DivisionByZero",
        "22023" => "InvalidParameterValue",
        "22025" => "InvalidEscapeSequence",
        "22026" => "StringDataLengthMismatch",
        "22P02" => "InvalidTextRepresentation",
        "22P05" => "UntranslatableCharacter",
        "23000" => "IntegrityConstraintViolation",
        "23001" => "RestrictViolation",
        "23502" => "NotNullViolation",
        "23503" => "ForeignKeyViolation",
        "23505" => "UniqueViolation",
        "23514" => "CheckViolation",
        "23P01" => "ExclusionViolation",
        "24000" => "InvalidCursorState",
        "25000" => "InvalidTransactionState",
        "25001" => "ActiveSqlTransaction",
        "25002" => "BranchTransactionAlreadyActive",
        "25006" => "ReadOnlySqlTransaction",
        "25P01" => "NoActiveSqlTransaction",
        "25P02" => "InFailedSqlTransaction",
        "26000" => "InvalidSqlStatementName",
        "28000" => "InvalidAuthorizationSpecification",
        "28P01" => "InvalidPassword",
        "2BP01" => "DependentObjectsStillExist",
        "2D000" => "InvalidTransactionTermination",
        "34000" => "InvalidCursorName",
        "3D000" => "InvalidCatalogName",
        "3F000" => "InvalidSchemaName",
        "40000" => "TransactionRollback",
        "40001" => "SerializationFailure",
        "40002" => "TransactionIntegrityConstraintViolation",
        "40003" => "StatementCompletionUnknown",
        "40P01" => "DeadlockDetected",
        "42000" => "SyntaxErrorOrAccessRuleViolation",
        "42601" => "SyntaxError",
        "42501" => "InsufficientPrivilege",
        "42602" => "InvalidName",
        "42622" => "NameTooLong",
        "42701" => "DuplicateColumn",
        "42702" => "AmbiguousColumn",
        "42703" => "UndefinedColumn",
        "42704" => "UndefinedObject",
        "42710" => "DuplicateObject",
        "42712" => "DuplicateAlias",
        "42723" => "DuplicateFunction",
        "42803" => "GroupingError",
        "42804" => "DatatypeMismatch",
        "42809" => "WrongObjectType",
        "42830" => "InvalidForeignKey",
        "42846" => "CannotCoerce",
        "42883" => "UndefinedFunction",
        "42939" => "ReservedName",
        "42P01" => "UndefinedTable",
        "42P02" => "UndefinedParameter",
        "42P03" => "DuplicateCursor",
        "42P04" => "DuplicateDatabase",
        "42P05" => "DuplicatePreparedStatement",
        "42P06" => "DuplicateSchema",
        "42P07" => "DuplicateTable",
        "42P18" => "IndeterminateDatatype",
        "44000" => "WithCheckOptionViolation",
        "53000" => "InsufficientResources",
        "53100" => "DiskFull",
        "53200" => "OutOfMemory",
        "53300" => "TooManyConnections",
        "54000" => "ProgramLimitExceeded",
        "55000" => "ObjectNotInPrerequisiteState",
        "55006" => "ObjectInUse",
        "55P03" => "LockNotAvailable",
        "57000" => "OperatorIntervention",
        "57014" => "QueryCanceled",
        "57P01" => "AdminShutdown",
        "57P02" => "CrashShutdown",
        "57P03" => "CannotConnectNow",
        "58000" => "SystemError",
        "58030" => "IoError",
        "58P01" => "UndefinedFile",
        "58P02" => "DuplicateFile",
        "P0000" => "PlpgsqlError",
        "P0001" => "RaiseException",
        "P0002" => "NoDataFound",
        "P0003" => "TooManyRows",
        "XX000" => "InternalError",
        "XX001" => "DataCorrupted",
        "XX002" => "IndexCorrupted",
        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_and_unknown_codes() {
        assert_eq!(condition_name("23505"), Some("UniqueViolation"));
        assert_eq!(condition_name("42P01"), Some("UndefinedTable"));
        assert_eq!(condition_name("ZZZZZ"), None);
    }
}
