pub mod match_engine;
pub mod statement;

pub use match_engine::{select_candidate, MatchCandidate};
pub use statement::{
    parse_statement, ColumnMap, FileKind, ParsedStatement, RowDiagnostic, RowProblem,
    StatementError,
};
