//! WPS 1.0.0 Execute requests and ExecuteResponse parsing.

use crate::ows::error::OwsError;
use crate::ows::exception::{exception_message, unescape_text};
use log::{debug, warn};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::{Client, Url};
use serde::Serialize;

pub const WPS_VERSION: &str = "1.0.0";

/// Completion state reported in a WPS `ExecuteResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProcessStatus {
    /// `wps:ProcessSucceeded`, with the server's status message.
    Succeeded(String),
    /// `wps:ProcessFailed` or an exception report, with the exception texts.
    Failed(String),
    /// Accepted, started or paused; the process did not finish synchronously.
    Pending(String),
}

/// A single `wps:Output` of an executed process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutput {
    pub identifier: String,
    pub value: String,
}

/// Parsed outcome of a WPS process execution.
///
/// Returned by [`crate::WoudcClient::data_extcsv`] and [`crate::WoudcClient::data_qa`]
/// only when the process succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub process: String,
    pub status: ProcessStatus,
    pub outputs: Vec<ProcessOutput>,
}

impl ProcessResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, ProcessStatus::Succeeded(_))
    }

    /// Value of the output with the given identifier, if present.
    pub fn output(&self, identifier: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|output| output.identifier == identifier)
            .map(|output| output.value.as_str())
    }

    fn failed(process: &str, message: String) -> Self {
        Self {
            process: process.to_string(),
            status: ProcessStatus::Failed(message),
            outputs: vec![],
        }
    }

    /// Parses a `wps:ExecuteResponse` document.
    pub(crate) fn parse(process: &str, xml: &str) -> Result<Self, OwsError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut status: Option<ProcessStatus> = None;
        let mut exception_texts: Vec<String> = Vec::new();
        let mut outputs = Vec::new();
        let mut current_output: Option<String> = None;
        let mut in_output = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"Output" => {
                        in_output = true;
                        current_output = None;
                    }
                    b"Identifier" if in_output => {
                        let text = reader.read_text(e.name())?;
                        current_output = Some(unescape_text(&text)?);
                    }
                    b"LiteralData" | b"ComplexData" | b"BoundingBoxData" if in_output => {
                        let text = reader.read_text(e.name())?;
                        let value = unescape_text(&text)?;
                        if let Some(identifier) = current_output.clone() {
                            outputs.push(ProcessOutput { identifier, value });
                        }
                    }
                    b"ProcessSucceeded" => {
                        let text = reader.read_text(e.name())?;
                        status = Some(ProcessStatus::Succeeded(unescape_text(&text)?));
                    }
                    b"ProcessAccepted" | b"ProcessStarted" | b"ProcessPaused" => {
                        status = Some(ProcessStatus::Pending(Self::status_label(e)));
                        reader.read_to_end(e.name())?;
                    }
                    b"ExceptionText" => {
                        let text = reader.read_text(e.name())?;
                        exception_texts.push(unescape_text(&text)?);
                    }
                    b"ProcessFailed" => {
                        status = Some(ProcessStatus::Failed(String::new()));
                    }
                    _ => {}
                },
                Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"ProcessSucceeded" => status = Some(ProcessStatus::Succeeded(String::new())),
                    b"ProcessFailed" => status = Some(ProcessStatus::Failed(String::new())),
                    b"ProcessAccepted" | b"ProcessStarted" | b"ProcessPaused" => {
                        status = Some(ProcessStatus::Pending(Self::status_label(e)))
                    }
                    _ => {}
                },
                Event::End(ref e) if e.local_name().as_ref() == b"Output" => {
                    in_output = false;
                    current_output = None;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let status = match status {
            Some(ProcessStatus::Failed(_)) => ProcessStatus::Failed(Self::join(exception_texts)),
            Some(status) => status,
            None => {
                return Err(OwsError::ServiceException {
                    url: process.to_string(),
                    message: "ExecuteResponse carries no process status".to_string(),
                })
            }
        };

        Ok(Self {
            process: process.to_string(),
            status,
            outputs,
        })
    }

    fn status_label(e: &BytesStart<'_>) -> String {
        String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
    }

    fn join(messages: Vec<String>) -> String {
        if messages.is_empty() {
            "process failed without a message".to_string()
        } else {
            messages.join("; ")
        }
    }
}

/// Builds the XML body of a WPS 1.0.0 Execute request with literal inputs.
pub(crate) fn execute_document(process: &str, inputs: &[(&str, &str)]) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push_str(&format!(
        r#"<wps:Execute service="WPS" version="{WPS_VERSION}" xmlns:wps="http://www.opengis.net/wps/1.0.0" xmlns:ows="http://www.opengis.net/ows/1.1">"#
    ));
    out.push_str(&format!("<ows:Identifier>{}</ows:Identifier>", escape(process)));
    out.push_str("<wps:DataInputs>");
    for (identifier, value) in inputs {
        out.push_str(&format!(
            "<wps:Input><ows:Identifier>{}</ows:Identifier><wps:Data><wps:LiteralData>{}</wps:LiteralData></wps:Data></wps:Input>",
            escape(*identifier),
            escape(*value)
        ));
    }
    out.push_str("</wps:DataInputs>");
    out.push_str("<wps:ResponseForm><wps:ResponseDocument/></wps:ResponseForm>");
    out.push_str("</wps:Execute>");
    out
}

/// Minimal WPS 1.0.0 transport: Execute over HTTP POST.
#[derive(Debug, Clone)]
pub(crate) struct WpsTransport {
    http: Client,
    url: Url,
}

impl WpsTransport {
    pub fn new(http: Client, url: Url) -> Self {
        Self { http, url }
    }

    pub async fn execute(
        &self,
        process: &str,
        inputs: &[(&str, &str)],
    ) -> Result<ProcessResult, OwsError> {
        let url = self.url.to_string();
        let body = execute_document(process, inputs);
        debug!("POST Execute {} to {} ({} bytes)", process, url, body.len());

        let response = self
            .http
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=UTF-8")
            .body(body)
            .send()
            .await
            .map_err(|e| OwsError::NetworkRequest(url.clone(), e))?;

        // WPS servers report rejected inputs as an ExceptionReport, often with a 4xx/5xx
        // status, so the body is inspected before the status.
        let status_error = response.error_for_status_ref().err();
        let text = response
            .text()
            .await
            .map_err(|e| OwsError::NetworkRequest(url.clone(), e))?;

        if let Some(message) = exception_message(&text) {
            warn!("Process {} reported an exception: {}", process, message);
            return Ok(ProcessResult::failed(process, message));
        }
        if let Some(e) = status_error {
            warn!("HTTP error for {}: {:?}", url, e);
            return Err(match e.status() {
                Some(status) => OwsError::HttpStatus {
                    url,
                    status,
                    source: e,
                },
                None => OwsError::NetworkRequest(url, e),
            });
        }
        ProcessResult::parse(process, &text)
    }
}
