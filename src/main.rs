//! CLI for ECDSA repeated-nonce key recovery

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use duplik::attack::{Attack, NonceReuseAttack, Vulnerability};
use duplik::forge;
use duplik::math::{self, parse_order_hex, parse_uint_decimal_strict, to_hex_string, ScalarKind};
use duplik::provider::load_signatures;
use duplik::recover::{recover_nonce, recover_private_key};
use duplik::signature::Signature;
use num_bigint::BigUint;
use serde::Serialize;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "duplik")]
#[command(about = "ECDSA private key recovery from repeated-nonce signatures")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true)]
    json: bool,

    #[arg(
        long,
        global = true,
        help = "Group order as hex (defaults to the secp256k1 order)"
    )]
    order: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a signature set for repeated-nonce groups and recover keys
    Analyze {
        #[arg(default_value = "-")]
        input: String,
    },
    /// Recover the key from two signatures given as decimal scalars
    Recover {
        #[arg(long, help = "Digest of message 1 as decimal")]
        h1: String,
        #[arg(long, help = "Digest of message 2 as decimal")]
        h2: String,
        #[arg(long)]
        s1: String,
        #[arg(long)]
        s2: String,
        #[arg(long)]
        r1: String,
        #[arg(long)]
        r2: String,
    },
    /// Sign two messages with a reused nonce, then recover the key
    Demo {
        #[arg(long, help = "Private key as decimal (random when omitted)")]
        key: Option<String>,
        #[arg(long, default_value = "1337", help = "Nonce reused across both signatures")]
        nonce: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(found_vulnerabilities) => {
            if found_vulnerabilities {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let order = match &cli.order {
        Some(hex) => parse_order_hex(hex)?,
        None => math::secp256k1_order(),
    };

    match cli.command {
        Command::Analyze { input } => {
            let signatures = load_signatures(&input, &order)?;
            let attack = NonceReuseAttack::new(order.clone());
            let vulns = attack.detect(&signatures);

            let output = format_analyze_output(&vulns, &attack, &signatures, &order, cli.json)?;
            println!("{}", output);

            Ok(!vulns.is_empty())
        }
        Command::Recover {
            h1,
            h2,
            s1,
            s2,
            r1,
            r2,
        } => {
            let h1 = parse_uint_decimal_strict(&h1, ScalarKind::Z, &order)?;
            let h2 = parse_uint_decimal_strict(&h2, ScalarKind::Z, &order)?;
            let s1 = parse_uint_decimal_strict(&s1, ScalarKind::RorS, &order)?;
            let s2 = parse_uint_decimal_strict(&s2, ScalarKind::RorS, &order)?;
            let r1 = parse_uint_decimal_strict(&r1, ScalarKind::RorS, &order)?;
            let r2 = parse_uint_decimal_strict(&r2, ScalarKind::RorS, &order)?;

            let private_key = recover_private_key(&h1, &h2, &s1, &s2, &r1, &r2, &order)?;
            let nonce = recover_nonce(&h1, &h2, &s1, &s2, &order)?;

            let report = RecoverReport {
                private_key_decimal: private_key.to_string(),
                private_key_hex: to_hex_string(&private_key, &order),
                nonce_decimal: nonce.to_string(),
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Private Key (decimal): {}", report.private_key_decimal);
                println!("Private Key (hex): {}", report.private_key_hex);
                println!("Nonce (decimal): {}", report.nonce_decimal);
            }

            Ok(false)
        }
        Command::Demo { key, nonce } => {
            if cli.order.is_some() {
                bail!("the demo always runs over secp256k1; --order is not supported here");
            }

            let private_key = match key {
                Some(k) => parse_uint_decimal_strict(&k, ScalarKind::RorS, &order)?,
                None => forge::random_private_key(),
            };
            let nonce = parse_uint_decimal_strict(&nonce, ScalarKind::RorS, &order)?;

            let report = run_demo(&private_key, &nonce, &order)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Message 1: {}", report.message_1);
                println!("Message 2: {}", report.message_2);
                println!("Reused nonce: {}", report.nonce_decimal);
                println!("Public key: {}", report.public_key);
                println!("Original private key: {}", report.original_private_key);
                println!("Recovered private key: {}", report.recovered_private_key);
                println!("Recovered nonce: {}", report.recovered_nonce);
            }

            Ok(false)
        }
    }
}

#[derive(Serialize)]
struct OutputReport {
    vulnerabilities: Vec<VulnerabilityOutput>,
    summary: SummaryOutput,
}

#[derive(Serialize)]
struct VulnerabilityOutput {
    #[serde(rename = "type")]
    vuln_type: String,
    confidence: f64,
    signatures_count: usize,
    pubkey: Option<String>,
    r_value: String,
    recovered_key: Option<RecoveredKeyOutput>,
    recovery_status: String,
    recovery_reason: Option<String>,
}

#[derive(Serialize)]
struct RecoveredKeyOutput {
    private_key_decimal: String,
    private_key_hex: String,
    nonce_decimal: String,
}

#[derive(Serialize)]
struct SummaryOutput {
    total_signatures: usize,
    vulnerabilities_found: usize,
    keys_recovered: usize,
}

#[derive(Serialize)]
struct RecoverReport {
    private_key_decimal: String,
    private_key_hex: String,
    nonce_decimal: String,
}

#[derive(Serialize)]
struct DemoReport {
    message_1: String,
    message_2: String,
    nonce_decimal: String,
    public_key: String,
    original_private_key: String,
    recovered_private_key: String,
    recovered_private_key_hex: String,
    recovered_nonce: String,
}

fn run_demo(private_key: &BigUint, nonce: &BigUint, order: &BigUint) -> Result<DemoReport> {
    let m1 = b"wagmi1";
    let m2 = b"wagmi2";

    let h1 = forge::digest_message(m1);
    let h2 = forge::digest_message(m2);
    let (r1, s1) = forge::sign_with_nonce(private_key, nonce, m1)?;
    let (r2, s2) = forge::sign_with_nonce(private_key, nonce, m2)?;

    let recovered = recover_private_key(&h1, &h2, &s1, &s2, &r1, &r2, order)?;
    let recovered_nonce = recover_nonce(&h1, &h2, &s1, &s2, order)?;

    if &recovered != private_key {
        bail!("sanity check failed: recovered key does not equal the original private key");
    }
    if &recovered_nonce != nonce {
        bail!("sanity check failed: recovered nonce does not equal the original nonce");
    }

    Ok(DemoReport {
        message_1: String::from_utf8_lossy(m1).into_owned(),
        message_2: String::from_utf8_lossy(m2).into_owned(),
        nonce_decimal: nonce.to_string(),
        public_key: forge::public_key_hex(private_key)?,
        original_private_key: private_key.to_string(),
        recovered_private_key: recovered.to_string(),
        recovered_private_key_hex: to_hex_string(&recovered, order),
        recovered_nonce: recovered_nonce.to_string(),
    })
}

fn format_analyze_output(
    vulns: &[Vulnerability],
    attack: &dyn Attack,
    sigs: &[Signature],
    order: &BigUint,
    json: bool,
) -> Result<String> {
    let mut vuln_outputs = Vec::new();
    let mut keys_recovered = 0;

    for vuln in vulns {
        let recovered = attack.recover(vuln);
        let (recovery_status, recovery_reason, recovered_key_output) = if let Some(key) = &recovered
        {
            keys_recovered += 1;
            (
                "recovered".to_string(),
                None,
                Some(RecoveredKeyOutput {
                    private_key_decimal: key.private_key.to_string(),
                    private_key_hex: to_hex_string(&key.private_key, order),
                    nonce_decimal: key.nonce.to_string(),
                }),
            )
        } else {
            (
                "unrecoverable".to_string(),
                Some("all pairs have s1 == s2".to_string()),
                None,
            )
        };

        vuln_outputs.push(VulnerabilityOutput {
            vuln_type: vuln.attack_type.clone(),
            confidence: vuln.group.confidence,
            signatures_count: vuln.group.signatures.len(),
            pubkey: vuln.group.pubkey.clone(),
            r_value: vuln.group.r.to_string(),
            recovered_key: recovered_key_output,
            recovery_status,
            recovery_reason,
        });
    }

    let report = OutputReport {
        vulnerabilities: vuln_outputs,
        summary: SummaryOutput {
            total_signatures: sigs.len(),
            vulnerabilities_found: vulns.len(),
            keys_recovered,
        },
    };

    if json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        let mut output = String::new();
        output.push_str(&format!("Analyzed {} signatures\n\n", sigs.len()));

        if vulns.is_empty() {
            output.push_str("No vulnerabilities found.\n");
        } else {
            output.push_str(&format!("Found {} vulnerabilities:\n\n", vulns.len()));

            for (i, vuln_output) in report.vulnerabilities.iter().enumerate() {
                output.push_str(&format!("Vulnerability #{}\n", i + 1));
                output.push_str(&format!("  Type: {}\n", vuln_output.vuln_type));
                output.push_str(&format!("  Confidence: {:.1}\n", vuln_output.confidence));
                output.push_str(&format!("  Signatures: {}\n", vuln_output.signatures_count));
                if let Some(pk) = &vuln_output.pubkey {
                    output.push_str(&format!("  Public Key: {}\n", pk));
                }
                output.push_str(&format!("  R Value: {}\n", vuln_output.r_value));

                if let Some(key) = &vuln_output.recovered_key {
                    output.push_str(&format!("  Status: {}\n", vuln_output.recovery_status));
                    output.push_str(&format!(
                        "  Private Key (decimal): {}\n",
                        key.private_key_decimal
                    ));
                    output.push_str(&format!("  Private Key (hex): {}\n", key.private_key_hex));
                    output.push_str(&format!("  Nonce (decimal): {}\n", key.nonce_decimal));
                } else {
                    output.push_str(&format!("  Status: {}\n", vuln_output.recovery_status));
                    if let Some(reason) = &vuln_output.recovery_reason {
                        output.push_str(&format!("  Reason: {}\n", reason));
                    }
                }
                output.push('\n');
            }
        }

        Ok(output)
    }
}
