use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use feedshift_transfer::{FtpConfig, FtpConnector, SessionConnector, TransferError};

/// A control-channel-only FTP server that refuses every password and records
/// the commands it receives until the client goes away.
fn spawn_rejecting_server() -> (u16, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut writer = stream;
        writer.write_all(b"220 test server ready\r\n").expect("greeting");

        let mut commands = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            let command = line.trim_end().to_string();
            let verb = command.split(' ').next().unwrap_or_default().to_ascii_uppercase();
            let reply: &[u8] = match verb.as_str() {
                "USER" => b"331 password required\r\n",
                "PASS" => b"530 login incorrect\r\n",
                "QUIT" => b"221 bye\r\n",
                _ => b"502 not implemented\r\n",
            };
            commands.push(command);
            writer.write_all(reply).expect("reply");
            if verb == "QUIT" {
                break;
            }
        }
        commands
    });

    (port, handle)
}

#[test]
fn rejected_login_still_closes_the_session() {
    let (port, server) = spawn_rejecting_server();
    let connector = FtpConnector::new(FtpConfig {
        host: "127.0.0.1".to_string(),
        port,
        username: "feeds".to_string(),
        password: "wrong".to_string(),
        timeout_secs: Some(5),
    })
    .expect("connector");

    let err = connector.connect().err().expect("login should fail");
    assert!(matches!(err, TransferError::Login { ref user, .. } if user == "feeds"));

    let commands = server.join().expect("server thread");
    assert_eq!(commands, vec!["USER feeds", "PASS wrong", "QUIT"]);
}

#[test]
fn empty_host_is_a_configuration_error() {
    let err = FtpConnector::new(FtpConfig::default()).unwrap_err();
    assert!(matches!(err, TransferError::Configuration(_)));
}
