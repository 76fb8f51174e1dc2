//! Integration tests driving the full send pipeline against a scripted
//! in-memory SMTP peer, without opening any real sockets.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;

use guildpost_mailer::{
    CalendarInvite, Connector, Mailbox, Mailer, MailerConfig, MemoryLog, Security,
    SimulationConfig,
};
use guildpost_smtp::{Connection, SmtpStream};

/// One scripted peer step.
enum Step {
    /// Read one command line, then send this reply.
    /// Multi-line replies are separated by `\n` in the script.
    Reply(&'static str),
    /// Read payload lines until the bare `.` terminator, then reply.
    DataReply(&'static str),
    /// Go silent for this long without reading or replying.
    Hold(Duration),
}

/// Runs a fake SMTP peer on the server half of a duplex pipe.
///
/// Returns every line the client sent, CRLF stripped.
fn spawn_peer(
    stream: DuplexStream,
    greeting: &'static str,
    steps: Vec<Step>,
) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let (read_half, mut write_half) = tokio::io::split(stream);
        let mut reader = BufReader::new(read_half);
        let mut seen = Vec::new();

        write_half
            .write_all(format!("{greeting}\r\n").as_bytes())
            .await
            .unwrap();

        for step in steps {
            match step {
                Step::Reply(reply) => {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap() == 0 {
                        break;
                    }
                    seen.push(line.trim_end().to_string());
                    for part in reply.split('\n') {
                        write_half
                            .write_all(format!("{part}\r\n").as_bytes())
                            .await
                            .unwrap();
                    }
                }
                Step::DataReply(reply) => {
                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).await.unwrap() == 0 {
                            break;
                        }
                        let line = line.trim_end().to_string();
                        let done = line == ".";
                        seen.push(line);
                        if done {
                            break;
                        }
                    }
                    write_half
                        .write_all(format!("{reply}\r\n").as_bytes())
                        .await
                        .unwrap();
                }
                Step::Hold(duration) => {
                    tokio::time::sleep(duration).await;
                }
            }
        }

        seen
    })
}

/// Connector that hands out pre-wired in-memory streams and counts dials.
struct ScriptedConnector {
    attempts: Arc<AtomicUsize>,
    streams: Mutex<VecDeque<SmtpStream>>,
}

impl ScriptedConnector {
    fn new(streams: Vec<SmtpStream>) -> (Self, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        (
            Self {
                attempts: Arc::clone(&attempts),
                streams: Mutex::new(streams.into_iter().collect()),
            },
            attempts,
        )
    }
}

impl Connector for ScriptedConnector {
    async fn connect(&self, config: &MailerConfig) -> guildpost_smtp::Result<Connection> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let stream = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted stream left");
        Ok(Connection::from_stream(stream, config.timeout))
    }
}

fn test_config(security: Security) -> MailerConfig {
    MailerConfig {
        host: "mail.example.org".into(),
        port: 587,
        security,
        username: "events@guild.example".into(),
        password: "hunter2".into(),
        from_address: "events@guild.example".into(),
        from_name: Some("Events Team".into()),
        timeout: Duration::from_secs(5),
        client_name: "app.guild.example".into(),
    }
}

fn recipient() -> Mailbox {
    Mailbox::with_name("Jo Smith", "member@example.net").unwrap()
}

const GREETING: &str = "220 mail.example.org ESMTP ready";

/// The cooperative peer: 250,334,334,235,250,250,354,250 plus QUIT.
fn happy_steps() -> Vec<Step> {
    vec![
        Step::Reply("250-mail.example.org\n250-STARTTLS\n250 AUTH PLAIN LOGIN"),
        Step::Reply("334 VXNlcm5hbWU6"),
        Step::Reply("334 UGFzc3dvcmQ6"),
        Step::Reply("235 2.7.0 accepted"),
        Step::Reply("250 2.1.0 sender ok"),
        Step::Reply("250 2.1.5 recipient ok"),
        Step::Reply("354 end data with <CRLF>.<CRLF>"),
        Step::DataReply("250 2.0.0 queued"),
        Step::Reply("221 2.0.0 bye"),
    ]
}

fn wire_up(steps: Vec<Step>) -> (ScriptedConnector, Arc<AtomicUsize>, JoinHandle<Vec<String>>) {
    let (client, server) = tokio::io::duplex(16 * 1024);
    let peer = spawn_peer(server, GREETING, steps);
    let (connector, attempts) = ScriptedConnector::new(vec![SmtpStream::custom(client)]);
    (connector, attempts, peer)
}

#[tokio::test]
async fn cooperative_peer_send_basic_succeeds() {
    let (connector, attempts, peer) = wire_up(happy_steps());
    let log = Arc::new(MemoryLog::new());
    let mailer = Mailer::with_connector(test_config(Security::None), connector)
        .with_log(Arc::clone(&log) as _);

    let sent = mailer
        .send_basic(&recipient(), "March social", "<p>See you Thursday.</p>")
        .await;
    assert!(sent);

    // Exactly one success record.
    let records = log.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].success);
    assert!(!records[0].simulated);
    assert_eq!(records[0].actor, "events@guild.example");
    assert_eq!(records[0].recipient_address, "member@example.net");
    assert_eq!(records[0].recipient_name.as_deref(), Some("Jo Smith"));
    assert!(records[0].error.is_none());

    // Peer ran its whole script and saw the sequence in order.
    let seen = peer.await.unwrap();
    assert_eq!(seen[0], "EHLO app.guild.example");
    assert_eq!(seen[1], "AUTH LOGIN");
    assert!(seen.contains(&"MAIL FROM:<events@guild.example>".to_string()));
    assert!(seen.contains(&"RCPT TO:<member@example.net>".to_string()));
    assert_eq!(seen.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn rcpt_rejection_surfaces_stage_and_server_text() {
    let steps = vec![
        Step::Reply("250-mail.example.org\n250 AUTH PLAIN LOGIN"),
        Step::Reply("334 VXNlcm5hbWU6"),
        Step::Reply("334 UGFzc3dvcmQ6"),
        Step::Reply("235 2.7.0 accepted"),
        Step::Reply("250 2.1.0 sender ok"),
        Step::Reply("550 5.1.1 no such user"),
    ];
    let (connector, _, peer) = wire_up(steps);
    let log = Arc::new(MemoryLog::new());
    let mailer = Mailer::with_connector(test_config(Security::None), connector)
        .with_log(Arc::clone(&log) as _);

    let report = mailer
        .send_detailed(&recipient(), "March social", "<p>hi</p>", None)
        .await;

    assert!(!report.success);
    let failure = report.failure.unwrap();
    assert_eq!(failure.stage, "RCPT TO");
    assert!(failure.server_text.unwrap().contains("550"));

    let records = log.records();
    assert_eq!(records.len(), 1);
    assert!(!records[0].success);
    assert!(records[0].error.as_deref().unwrap().contains("550"));

    // No DATA was ever attempted.
    let seen = peer.await.unwrap();
    assert!(!seen.iter().any(|l| l == "DATA"));
}

#[tokio::test]
async fn send_basic_collapses_rcpt_rejection_to_false() {
    let steps = vec![
        Step::Reply("250-mail.example.org\n250 AUTH PLAIN LOGIN"),
        Step::Reply("334 VXNlcm5hbWU6"),
        Step::Reply("334 UGFzc3dvcmQ6"),
        Step::Reply("235 2.7.0 accepted"),
        Step::Reply("250 2.1.0 sender ok"),
        Step::Reply("550 5.1.1 no such user"),
    ];
    let (connector, _, _peer) = wire_up(steps);
    let log = Arc::new(MemoryLog::new());
    let mailer = Mailer::with_connector(test_config(Security::None), connector)
        .with_log(Arc::clone(&log) as _);

    let sent = mailer.send_basic(&recipient(), "March social", "<p>hi</p>").await;
    assert!(!sent);
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn starttls_refusal_aborts_before_authentication() {
    let steps = vec![
        Step::Reply("250-mail.example.org\n250-STARTTLS\n250 AUTH PLAIN LOGIN"),
        Step::Reply("454 4.7.0 TLS not available due to temporary reason"),
    ];
    let (connector, _, peer) = wire_up(steps);
    let log = Arc::new(MemoryLog::new());
    let mailer = Mailer::with_connector(test_config(Security::StartTls), connector)
        .with_log(Arc::clone(&log) as _);

    let report = mailer
        .send_detailed(&recipient(), "March social", "<p>hi</p>", None)
        .await;

    assert!(!report.success);
    let failure = report.failure.unwrap();
    assert_eq!(failure.stage, "STARTTLS");
    assert!(failure.server_text.unwrap().contains("454"));

    // Credentials were never sent on the refused channel.
    let seen = peer.await.unwrap();
    assert!(!seen.iter().any(|l| l.starts_with("AUTH")));
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn data_payload_is_dot_stuffed_on_the_wire() {
    let (connector, _, peer) = wire_up(happy_steps());
    let mailer = Mailer::with_connector(test_config(Security::None), connector)
        .with_log(Arc::new(MemoryLog::new()) as _);

    let report = mailer
        .send_detailed(
            &recipient(),
            "Minutes",
            "<p>Agenda:</p>\n.\n<p>end</p>",
            None,
        )
        .await;
    assert!(report.success);

    let seen = peer.await.unwrap();
    // The lone "." body line was doubled; the terminator stayed bare.
    assert!(seen.contains(&"..".to_string()));
    assert_eq!(seen.iter().filter(|l| l.as_str() == ".").count(), 1);
}

#[tokio::test]
async fn calendar_invite_is_transmitted_as_multipart() {
    let (connector, _, peer) = wire_up(happy_steps());
    let log = Arc::new(MemoryLog::new());
    let mailer = Mailer::with_connector(test_config(Security::None), connector)
        .with_log(Arc::clone(&log) as _);

    let invite = CalendarInvite::new(
        "social.ics",
        "BEGIN:VCALENDAR\r\nMETHOD:REQUEST\r\nEND:VCALENDAR",
    );
    let report = mailer
        .send_detailed(
            &recipient(),
            "March social",
            "<p>See you Thursday.</p>",
            Some(invite),
        )
        .await;
    assert!(report.success);

    let seen = peer.await.unwrap();
    assert!(
        seen.iter()
            .any(|l| l.starts_with("Content-Type: multipart/mixed; boundary="))
    );
    assert!(
        seen.contains(
            &"Content-Disposition: attachment; filename=\"social.ics\"".to_string()
        )
    );
    assert!(seen.contains(&"Content-Type: text/calendar; method=REQUEST".to_string()));
    assert!(seen.contains(&"BEGIN:VCALENDAR".to_string()));

    // The log snapshot carries a marker, not the payload.
    let records = log.records();
    assert!(records[0].body_snapshot.contains("[attachment: social.ics]"));
    assert!(!records[0].body_snapshot.contains("VCALENDAR"));
}

#[tokio::test]
async fn simulated_send_never_dials() {
    let (connector, attempts) = ScriptedConnector::new(Vec::new());
    let log = Arc::new(MemoryLog::new());
    let mailer = Mailer::with_connector(test_config(Security::Tls), connector)
        .with_log(Arc::clone(&log) as _)
        .with_simulation(SimulationConfig {
            delay: Duration::from_millis(10),
            failure_probability: 0.0,
        });

    let report = mailer
        .send_simulated(&recipient(), "March social", "<p>hi</p>", None)
        .await;

    assert!(report.success);
    assert_eq!(attempts.load(Ordering::SeqCst), 0);

    let records = log.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].simulated);
    assert!(records[0].body_snapshot.starts_with("[simulated]"));
}

#[tokio::test]
async fn simulated_failure_probability_one_always_fails() {
    let (connector, attempts) = ScriptedConnector::new(Vec::new());
    let log = Arc::new(MemoryLog::new());
    let mailer = Mailer::with_connector(test_config(Security::Tls), connector)
        .with_log(Arc::clone(&log) as _)
        .with_simulation(SimulationConfig {
            delay: Duration::from_millis(1),
            failure_probability: 1.0,
        });

    let report = mailer
        .send_simulated(&recipient(), "March social", "<p>hi</p>", None)
        .await;

    assert!(!report.success);
    assert_eq!(report.failure.unwrap().stage, "simulated");
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
    assert_eq!(log.len(), 1);
    assert!(!log.records()[0].success);
}

#[tokio::test]
async fn invalid_configuration_fails_without_dialing() {
    let (connector, attempts) = ScriptedConnector::new(Vec::new());
    let log = Arc::new(MemoryLog::new());
    let config = MailerConfig {
        host: String::new(),
        password: String::new(),
        ..test_config(Security::Tls)
    };
    let mailer = Mailer::with_connector(config, connector).with_log(Arc::clone(&log) as _);

    let report = mailer
        .send_detailed(&recipient(), "March social", "<p>hi</p>", None)
        .await;

    assert!(!report.success);
    let failure = report.failure.unwrap();
    assert_eq!(failure.stage, "configuration");
    assert!(failure.message.contains("SMTP server is required"));
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn silent_peer_times_out_at_the_stage_in_progress() {
    let steps = vec![Step::Hold(Duration::from_secs(2))];
    let (client, server) = tokio::io::duplex(16 * 1024);
    let _peer = spawn_peer(server, GREETING, steps);
    let (connector, _) = ScriptedConnector::new(vec![SmtpStream::custom(client)]);

    let config = MailerConfig {
        timeout: Duration::from_millis(100),
        ..test_config(Security::None)
    };
    let log = Arc::new(MemoryLog::new());
    let mailer = Mailer::with_connector(config, connector).with_log(Arc::clone(&log) as _);

    let report = mailer
        .send_detailed(&recipient(), "March social", "<p>hi</p>", None)
        .await;

    assert!(!report.success);
    let failure = report.failure.unwrap();
    assert_eq!(failure.stage, "EHLO");
    assert!(failure.message.contains("timed out"));
    assert_eq!(log.len(), 1);
}
