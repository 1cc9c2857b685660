//! Reachability probe backed by the system `ping` binary.
//!
//! One echo request with a three second deadline against a well-known
//! host. Raw ICMP needs either root or a dedicated socket capability;
//! the setuid `ping` binary that every target distro ships sidesteps
//! both, at the cost of one short-lived child process per probe.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::app::ports::ProbePort;

const PING_ARGS: [&str; 4] = ["-c", "1", "-w", "3"];

pub struct PingProbe {
    program: String,
    args: Vec<String>,
}

impl PingProbe {
    /// Probe by pinging the given host.
    pub fn new(host: &str) -> Self {
        let mut args: Vec<String> = PING_ARGS.iter().map(|s| (*s).to_owned()).collect();
        args.push(host.to_owned());
        Self {
            program: "ping".to_owned(),
            args,
        }
    }

    /// Substitute an arbitrary command for the probe. Tests use this to
    /// fake both outcomes without touching the network.
    pub fn with_command(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl ProbePort for PingProbe {
    fn probe(&mut self) -> bool {
        let outcome = Command::new(&self.program)
            .args(&self.args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match outcome {
            Ok(status) => status.success(),
            Err(err) => {
                debug!(program = %self.program, %err, "probe command failed to spawn");
                false
            }
        }
    }
}
