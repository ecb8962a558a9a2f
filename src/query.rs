//! Simple query execution.
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::connection::Connection;
use crate::error::{ErrorKind, Result};
use crate::protocol::{BackendMessage, ProtocolError, frontend::Query};
use crate::row::{ColumnDescription, QueryResult, Row};
use crate::value::Value;

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Run one simple query and collect its result.
    ///
    /// `sql` may contain multiple statements separated by semicolons; rows
    /// and command tags accumulate across all of them.
    ///
    /// A server reported error fails the call with
    /// [`ErrorKind::Database`] and discards the partial result, but the
    /// connection itself stays usable: the exchange is drained to its
    /// `ReadyForQuery` first. Any transport or protocol failure leaves the
    /// connection unusable.
    pub async fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        self.require_connected()?;
        self.begin_exchange()?;
        log::trace!("query: {sql}");

        match self.run_query(sql).await {
            Ok(result) => {
                self.end_exchange();
                Ok(result)
            }
            Err(err) if matches!(err.kind(), ErrorKind::Database(_)) => {
                match self.resync().await {
                    Ok(()) => self.end_exchange(),
                    Err(_) => self.mark_failed(),
                }
                Err(err)
            }
            Err(err) => {
                self.mark_failed();
                Err(err)
            }
        }
    }

    async fn run_query(&mut self, sql: &str) -> Result<QueryResult> {
        let camel_case = self.camel_case();
        self.stream().send(&Query { sql }).await?;

        let mut active: Option<Arc<[ColumnDescription]>> = None;
        let mut rows = Vec::new();
        let mut command_tags = Vec::new();

        loop {
            match self.stream().recv().await? {
                BackendMessage::RowDescription(desc) => {
                    // a later statement in the same query string replaces
                    // the active columns, already decoded rows keep theirs
                    let columns: Vec<_> = desc
                        .fields
                        .into_iter()
                        .map(|field| ColumnDescription::new(field, camel_case))
                        .collect();
                    active = Some(columns.into());
                }
                BackendMessage::DataRow(data) => {
                    let Some(columns) = &active else {
                        return Err(ProtocolError::unexpected_phase(b'D', "query").into());
                    };
                    if data.columns.len() != columns.len() {
                        return Err(ProtocolError::ColumnCountMismatch {
                            described: columns.len(),
                            received: data.columns.len(),
                        }
                        .into());
                    }

                    let mut values = Vec::with_capacity(columns.len());
                    for (cell, column) in data.columns.into_iter().zip(columns.iter()) {
                        values.push(match cell {
                            None => Value::Null,
                            Some(bytes) => {
                                let text = std::str::from_utf8(&bytes)
                                    .map_err(ProtocolError::NonUtf8)?;
                                Value::decode(text, column.type_oid)?
                            }
                        });
                    }
                    rows.push(Row::new(columns.clone(), values));
                }
                BackendMessage::CommandComplete(done) => command_tags.push(done.tag),
                BackendMessage::EmptyQueryResponse => {}
                BackendMessage::ParameterStatus(param) => {
                    // reported when a statement changed a run-time setting
                    self.set_server_param(param.name, param.value);
                }
                BackendMessage::ErrorResponse(error) => return Err(error.into()),
                BackendMessage::ReadyForQuery(ready) => {
                    self.set_server_status(ready.status);
                    return Ok(QueryResult {
                        row_count: rows.len(),
                        rows,
                        columns: active.unwrap_or_else(|| Vec::new().into()),
                        command_tags,
                    });
                }
                message => {
                    return Err(ProtocolError::unexpected_phase(message.tag(), "query").into());
                }
            }
        }
    }

    /// Drain the failed exchange to its `ReadyForQuery`.
    async fn resync(&mut self) -> Result<()> {
        loop {
            if let BackendMessage::ReadyForQuery(ready) = self.stream().recv().await? {
                self.set_server_status(ready.status);
                return Ok(());
            }
        }
    }
}
