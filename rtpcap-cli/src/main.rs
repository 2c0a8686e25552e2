use analyzer::{FrameConfigBuilder, FrameRecord, FrameTypePolicy, StreamKey, StreamMap};
use anyhow::{Result, bail};
use clap::Parser;
use conversation::{UdpConversation, parse_udp_conversations};
use log::{error, info};
use shared::SEP;
use shared::util::validate_separator;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "rtpcap")]
#[command(version)]
#[command(about = "Per-frame loss, reordering and latency metrics for the RTP streams of a parsed capture.")]
struct Cli {
    #[arg(short, long)]
    debug: bool,
    #[arg(short, long, default_value_t = format!("INFO"))]
    log_level: String,
    /// JSON array of parsed packet records, in capture order
    #[arg(short, long, default_value_t = format!(""))]
    input_file: String,
    /// Only analyze streams from this source address
    #[arg(long)]
    source: Option<String>,
    /// Only analyze streams with this SSRC
    #[arg(long)]
    ssrc: Option<u32>,
    /// Separator of the rtp_seq_list column
    #[arg(long, default_value_t = SEP, value_parser = parse_separator)]
    separator: char,
    /// Frame type policy: first-frame, after-loss or min-packets=N
    #[arg(long, default_value = "first-frame")]
    frame_type: FrameTypePolicy,
    /// Print per-stream totals instead of one row per frame
    #[arg(long)]
    summary: bool,
    /// UDP conversation report to parse instead of packet records
    #[arg(long, default_value_t = format!(""))]
    conversations: String,
    #[arg(short, long, default_value_t = format!(""))]
    output_file: String,
}

fn parse_separator(s: &str) -> std::result::Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(sep), None) => validate_separator(sep).map_err(|e| e.to_string()),
        _ => Err(format!("separator must be a single character, got {s:?}")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = log::LevelFilter::from_str(&cli.log_level)?;
    if cli.debug {
        env_logger::Builder::new()
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{}:{} [{}] {} - {}",
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0),
                    record.level(),
                    chrono::Local::now().format("%H:%M:%S.%6f"),
                    record.args()
                )
            })
            .filter(None, log_level)
            .init();
    }

    let mut out: Box<dyn Write> = if cli.output_file.is_empty() {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else {
        Box::new(BufWriter::new(File::create(&cli.output_file)?))
    };

    if !cli.conversations.is_empty() {
        write_conversations(&cli.conversations, &mut out)?;
    } else if !cli.input_file.is_empty() {
        write_frames(&cli, &mut out)?;
    } else {
        bail!("either --input-file or --conversations is required");
    }

    out.flush()?;
    Ok(())
}

fn selected_keys(cli: &Cli, streams: &StreamMap) -> Vec<StreamKey> {
    match (&cli.source, cli.ssrc) {
        (Some(address), Some(ssrc)) => vec![StreamKey::new(address.as_str(), ssrc)],
        _ => streams
            .keys()
            .filter(|key| cli.source.as_ref().is_none_or(|a| *a == key.address))
            .filter(|key| cli.ssrc.is_none_or(|s| s == key.ssrc))
            .collect(),
    }
}

fn write_frames(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let streams = StreamMap::from_json(&fs::read_to_string(&cli.input_file)?)?;
    info!("{} streams in {}", streams.len(), cli.input_file);

    let config = FrameConfigBuilder::new()
        .with_separator(cli.separator)
        .with_video_type(cli.frame_type)
        .build()?;
    let keys = selected_keys(cli, &streams);
    let reports = analyzer::analyze_streams(&streams, &keys, &config);

    if cli.summary {
        writeln!(out, "ip_src,rtp_ssrc,frames,packets,bytes,ploss,porder,pdups")?;
    } else {
        writeln!(out, "ip_src,rtp_ssrc,{}", FrameRecord::FIELDS.join(","))?;
    }

    let mut failed = 0;
    for report in &reports {
        let frames = match &report.frames {
            Ok(frames) => frames,
            Err(err) => {
                error!("{} ssrc {}: {}", report.key.address, report.key.ssrc, err);
                failed += 1;
                continue;
            }
        };
        if let Some(s) = report.summary().filter(|_| cli.summary) {
            writeln!(
                out,
                "{},{},{},{},{},{},{},{}",
                report.key.address,
                report.key.ssrc,
                s.frames,
                s.packets,
                s.bytes,
                s.loss,
                s.out_of_order,
                s.duplicates
            )?;
            continue;
        }
        for frame in frames {
            writeln!(
                out,
                "{},{},{}",
                report.key.address,
                report.key.ssrc,
                frame.to_row().join(",")
            )?;
        }
    }

    if failed > 0 && failed == reports.len() {
        bail!("no stream could be analyzed");
    }
    Ok(())
}

fn write_conversations(path: &str, out: &mut dyn Write) -> Result<()> {
    let report = fs::read_to_string(path)?;
    let conversations = parse_udp_conversations(&report);
    info!("{} udp conversations in {}", conversations.len(), path);

    writeln!(
        out,
        "proto,laddr,lport,raddr,rport,rpkts,rbytes,lpkts,lbytes,tpkts,tbytes,start,duration,rbytes_n,lbytes_n,tbytes_n"
    )?;
    for conv in &conversations {
        writeln!(out, "{}", conversation_row(conv))?;
    }
    Ok(())
}

fn conversation_row(conv: &UdpConversation) -> String {
    let count = |n: Option<u64>| n.map(|n| n.to_string()).unwrap_or_default();
    let (rbytes, lbytes, tbytes) = conv.byte_counts();
    // raw counters carry thousands separators, so they are quoted
    format!(
        "{},{},{},{},{},{},\"{}\",{},\"{}\",{},\"{}\",{},{},{},{},{}",
        conv.proto,
        conv.laddr,
        conv.lport,
        conv.raddr,
        conv.rport,
        conv.rpkts,
        conv.rbytes,
        conv.lpkts,
        conv.lbytes,
        conv.tpkts,
        conv.tbytes,
        conv.start,
        conv.duration,
        count(rbytes),
        count(lbytes),
        count(tbytes)
    )
}
