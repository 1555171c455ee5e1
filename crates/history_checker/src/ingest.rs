use {
    crate::{Action, Event, HistoryError, HistoryModel, Result},
    consistency_model::Operation,
    serde::Deserialize,
    std::{
        fmt::{Display, Formatter},
        io,
        str::FromStr,
    },
    tracing::debug,
};

/// The schema of a history log.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LogFormat {
    /// Decide from the header.
    #[default]
    Auto,
    /// One row per completed operation: `call_ns`, `return_ns`, `client_id`, `op`, `value`,
    /// `output`, and `key` for keyed models.
    Paired,
    /// One row per invocation or response: `UniqueID`, `ClientID`, `Kind`, `Action` and up to
    /// three payloads.
    Interleaved,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(LogFormat::Auto),
            "paired" => Ok(LogFormat::Paired),
            "interleaved" => Ok(LogFormat::Interleaved),
            _ => Err(format!("unknown log format {s:?} (use auto|paired|interleaved)")),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogFormat::Auto => "auto",
            LogFormat::Paired => "paired",
            LogFormat::Interleaved => "interleaved",
        })
    }
}

/// A parsed log, before any interleaved events have been paired up.
#[derive(Clone, Debug, PartialEq)]
pub enum RawLog<I> {
    Paired(Vec<Operation<I, Option<String>>>),
    Interleaved(Vec<Event>),
}

const INTERLEAVED_COLUMNS: [&str; 4] = ["uniqueid", "clientid", "kind", "action"];
const PAIRED_COLUMNS: [&str; 6] = ["call_ns", "return_ns", "client_id", "op", "value", "output"];

#[derive(Deserialize)]
struct InterleavedRow {
    #[serde(rename = "uniqueid")]
    id: String,
    #[serde(rename = "clientid")]
    client_id: String,
    kind: String,
    action: String,
    #[serde(default)]
    payload1: String,
    #[serde(default)]
    payload2: String,
    #[serde(default)]
    payload3: String,
}

#[derive(Deserialize)]
struct PairedRow {
    call_ns: String,
    return_ns: String,
    client_id: String,
    op: String,
    value: String,
    output: String,
    #[serde(default)]
    key: Option<String>,
}

/// Opens a CSV reader whose header names are trimmed and lowercased, so columns match
/// case-insensitively.
fn open<R: io::Read>(reader: R, trim: csv::Trim) -> Result<(csv::Reader<R>, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(trim)
        .from_reader(reader);
    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    reader.set_headers(csv::StringRecord::from(header.clone()));
    Ok((reader, header))
}

fn require(header: &[String], columns: &[&'static str]) -> Result<()> {
    match columns.iter().find(|&&c| !header.iter().any(|h| h == c)) {
        Some(&column) => Err(HistoryError::MissingColumn {
            column,
            header: header.to_vec(),
        }),
        None => Ok(()),
    }
}

fn detect(header: &[String]) -> Result<LogFormat> {
    let has = |column: &str| header.iter().any(|h| h == column);
    if has("uniqueid") && has("kind") {
        Ok(LogFormat::Interleaved)
    } else if has("call_ns") {
        Ok(LogFormat::Paired)
    } else {
        Err(HistoryError::UnknownFormat {
            header: header.to_vec(),
        })
    }
}

fn integer<T: FromStr>(row: usize, column: &'static str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| HistoryError::InvalidInteger {
            row,
            column,
            value: value.to_string(),
        })
}

/// Reads a log in the given format, detecting it from the header for [`LogFormat::Auto`].
pub fn read_log<M: HistoryModel, R: io::Read>(
    mut reader: R,
    format: LogFormat,
) -> Result<RawLog<M::Input>> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(csv::Error::from)?;
    let format = match format {
        LogFormat::Auto => detect(&open(text.as_bytes(), csv::Trim::Headers)?.1)?,
        format => format,
    };
    debug!(%format, bytes = text.len(), "Reading log.");
    match format {
        LogFormat::Paired => Ok(RawLog::Paired(read_paired::<M, _>(text.as_bytes())?)),
        LogFormat::Auto | LogFormat::Interleaved => {
            Ok(RawLog::Interleaved(read_events(text.as_bytes())?))
        }
    }
}

/// Reads the events of an interleaved log in file order.
///
/// Client ids must be integers. Payloads are kept verbatim, surrounding whitespace included.
pub fn read_events<R: io::Read>(reader: R) -> Result<Vec<Event>> {
    let (mut reader, header) = open(reader, csv::Trim::Headers)?;
    require(&header, &INTERLEAVED_COLUMNS)?;
    let mut events = Vec::new();
    for (i, record) in reader.deserialize::<InterleavedRow>().enumerate() {
        let row = i + 1;
        let record = record?;
        events.push(Event {
            client_id: integer(row, "ClientID", &record.client_id)?,
            kind: record
                .kind
                .parse()
                .map_err(|value| HistoryError::InvalidKind { row, value })?,
            action: Action::classify(&record.action),
            id: record.id,
            payloads: [record.payload1, record.payload2, record.payload3],
        });
    }
    Ok(events)
}

/// Reads the operations of a paired log in file order.
///
/// Every value is trimmed and an empty `output` is recorded as absent.
pub fn read_paired<M: HistoryModel, R: io::Read>(
    reader: R,
) -> Result<Vec<Operation<M::Input, Option<String>>>> {
    let (mut reader, header) = open(reader, csv::Trim::All)?;
    require(&header, &PAIRED_COLUMNS)?;
    if M::KEYED {
        require(&header, &["key"])?;
    }
    let mut operations = Vec::new();
    for (i, record) in reader.deserialize::<PairedRow>().enumerate() {
        let row = i + 1;
        let record = record?;
        let key = if M::KEYED { record.key } else { None };
        operations.push(Operation {
            client_id: integer(row, "client_id", &record.client_id)?,
            input: M::input_from_row(row, &record.op, key, record.value)?,
            call: integer(row, "call_ns", &record.call_ns)?,
            output: Some(record.output).filter(|o| !o.is_empty()),
            ret: integer(row, "return_ns", &record.return_ns)?,
        });
    }
    Ok(operations)
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{EventKind, KvInput, KvModel, QueueInput, QueueModel},
    };

    #[test]
    fn reads_interleaved_events() {
        let csv = "\
UniqueID,ClientID,Kind,Action,Payload1,Payload2,Payload3
a, 1 ,Invocation,kv_write,,x,1
a,1,Response,kv_write,ok,,
b,2,Invocation,noise,,,
";
        let events = read_events(csv.as_bytes()).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].id, "a");
        assert_eq!(events[0].client_id, 1);
        assert_eq!(events[0].kind, EventKind::Invocation);
        assert_eq!(events[0].action, Some(Action::Write));
        assert_eq!(events[0].payloads, ["".to_string(), "x".to_string(), "1".to_string()]);
        assert_eq!(events[1].kind, EventKind::Response);
        assert_eq!(events[1].payloads[0], "ok");
        assert_eq!(events[2].action, None);
    }

    #[test]
    fn matches_headers_case_insensitively() {
        let csv = " uniqueid ,CLIENTID,kind,ACTION\na,1,Invocation,q_read\n";
        let events = read_events(csv.as_bytes()).unwrap();
        assert_eq!(events[0].action, Some(Action::Read));
        assert_eq!(events[0].payloads, [String::new(), String::new(), String::new()]);
    }

    #[test]
    fn rejects_non_integer_client_ids() {
        let csv = "UniqueID,ClientID,Kind,Action\na,1,Invocation,q_read\nb,two,Response,q_read\n";
        let err = read_events(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::InvalidInteger { row: 2, column: "ClientID", ref value } if value == "two"
        ));
    }

    #[test]
    fn rejects_unknown_event_kinds() {
        let csv = "UniqueID,ClientID,Kind,Action\na,1,Call,q_read\n";
        let err = read_events(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidKind { row: 1, ref value } if value == "Call"));
    }

    #[test]
    fn rejects_missing_columns() {
        let csv = "UniqueID,Kind,Action\na,Invocation,q_read\n";
        let err = read_events(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::MissingColumn { column: "clientid", .. }));
    }

    #[test]
    fn reads_paired_kv_rows() {
        let csv = r#"call_ns,return_ns,client_id,op,key,value,output
10,20,1, put , x , 1 ,
30,40,2,GET,x,,"{""type"":""VOption"",""value"":1}"
"#;
        let ops = read_paired::<KvModel, _>(csv.as_bytes()).unwrap();
        assert_eq!(
            ops,
            vec![
                Operation {
                    client_id: 1,
                    input: KvInput::Put {
                        key: "x".to_string(),
                        value: "1".to_string()
                    },
                    call: 10,
                    output: None,
                    ret: 20,
                },
                Operation {
                    client_id: 2,
                    input: KvInput::Get {
                        key: "x".to_string()
                    },
                    call: 30,
                    output: Some(r#"{"type":"VOption","value":1}"#.to_string()),
                    ret: 40,
                },
            ]
        );
    }

    #[test]
    fn paired_queue_logs_need_no_key() {
        let csv = "Call_NS,Return_NS,Client_ID,Op,Value,Output\n1,2,0,ENQ,a,\n3,4,0,DEQ,,a\n";
        let ops = read_paired::<QueueModel, _>(csv.as_bytes()).unwrap();
        assert_eq!(ops[0].input, QueueInput::Enq { value: "a".to_string() });
        assert_eq!(ops[1].output.as_deref(), Some("a"));
    }

    #[test]
    fn paired_kv_logs_need_a_key_column() {
        let csv = "call_ns,return_ns,client_id,op,value,output\n1,2,0,GET,,\n";
        let err = read_paired::<KvModel, _>(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::MissingColumn { column: "key", .. }));
    }

    #[test]
    fn short_paired_kv_rows_lack_a_key() {
        let csv = "call_ns,return_ns,client_id,op,value,output,key\n1,2,0,PUT,1,,x\n3,4,0,GET,,\n";
        let err = read_paired::<KvModel, _>(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::MissingKey { row: 2 }));
    }

    #[test]
    fn paired_rows_report_bad_timestamps_and_ops() {
        let csv = "call_ns,return_ns,client_id,op,value,output\n1,2,0,ENQ,a,\n3,soon,0,DEQ,,a\n";
        let err = read_paired::<QueueModel, _>(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidInteger { row: 2, column: "return_ns", .. }));

        let csv = "call_ns,return_ns,client_id,op,value,output\n1,2,0,PUSH,a,\n";
        let err = read_paired::<QueueModel, _>(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::UnknownOperation { row: 1, .. }));
    }

    #[test]
    fn detects_formats_from_the_header() {
        let interleaved = "UniqueID,ClientID,Kind,Action\n";
        let paired = "call_ns,return_ns,client_id,op,value,output\n";
        assert!(matches!(
            read_log::<QueueModel, _>(interleaved.as_bytes(), LogFormat::Auto),
            Ok(RawLog::Interleaved(events)) if events.is_empty()
        ));
        assert!(matches!(
            read_log::<QueueModel, _>(paired.as_bytes(), LogFormat::Auto),
            Ok(RawLog::Paired(ops)) if ops.is_empty()
        ));
        assert!(matches!(
            read_log::<QueueModel, _>("a,b,c\n".as_bytes(), LogFormat::Auto),
            Err(HistoryError::UnknownFormat { .. })
        ));
        assert!(matches!(
            read_log::<QueueModel, _>(interleaved.as_bytes(), LogFormat::Paired),
            Err(HistoryError::MissingColumn { column: "call_ns", .. })
        ));
    }

    #[test]
    fn parses_log_formats() {
        assert_eq!("Paired".parse(), Ok(LogFormat::Paired));
        assert_eq!("interleaved".parse(), Ok(LogFormat::Interleaved));
        assert_eq!(LogFormat::default(), LogFormat::Auto);
        assert!("json".parse::<LogFormat>().is_err());
    }
}
