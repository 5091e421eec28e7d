//! Command-line arguments.

use anyhow::Result;
use clap::Parser;
use nc_stream::{Chunks, ObjectLocation, StorageOptions, StreamOptions};
use serde_json::Value;

/// Stream a NetCDF file from S3 and print the dataset.
#[derive(Parser, Debug)]
#[command(name = "nc-stream")]
#[command(about = "Stream a NetCDF file from S3 and print the dataset")]
pub struct Args {
    /// S3 bucket name
    #[arg(long, required_unless_present = "url", conflicts_with = "url")]
    pub bucket: Option<String>,

    /// Object key (.nc, .nc4 or .cdf)
    #[arg(long, required_unless_present = "url", conflicts_with = "url")]
    pub key: Option<String>,

    /// Full object URL instead of --bucket/--key (s3://bucket/key)
    #[arg(long)]
    pub url: Option<String>,

    /// Group to open (default: root group)
    #[arg(long)]
    pub group: Option<String>,

    /// Decoder engine: netcdf4, h5netcdf or scipy (default: auto-detect)
    #[arg(long)]
    pub engine: Option<String>,

    /// Storage option for the S3 client (can repeat)
    #[arg(long = "storage-option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub storage_options: Vec<(String, String)>,

    /// Block sizes as JSON: 100, -1, "auto" or {"dim": n}
    #[arg(long, value_name = "JSON", value_parser = parse_chunks)]
    pub chunks: Option<Chunks>,

    /// Extra decoder option, value as JSON (can repeat). Supported:
    /// mask_and_scale=<bool> (default true), drop_variables=<name or [names]>
    #[arg(long = "decode-option", value_name = "KEY=JSON", value_parser = parse_decode_option)]
    pub decode_options: Vec<(String, Value)>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Bucket and key to stream.
    pub fn location(&self) -> Result<ObjectLocation> {
        match (&self.url, &self.bucket, &self.key) {
            (Some(url), _, _) => Ok(ObjectLocation::parse(url)?),
            (None, Some(bucket), Some(key)) => Ok(ObjectLocation::new(bucket, key)),
            _ => anyhow::bail!("either --url or both --bucket and --key are required"),
        }
    }

    pub fn stream_options(&self) -> StreamOptions {
        let mut options = StreamOptions {
            group: self.group.clone(),
            engine: self.engine.clone(),
            storage_options: self.storage_options.iter().cloned().collect::<StorageOptions>(),
            chunks: self.chunks.clone(),
            ..StreamOptions::default()
        };
        options.decode_options.extend(self.decode_options.iter().cloned());
        options
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| "--storage-option must be in key=value format".to_string())
}

fn parse_chunks(s: &str) -> Result<Chunks, String> {
    let value: Value = serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))?;
    Chunks::from_json(&value).map_err(|e| e.to_string())
}

/// Values that are not valid JSON are taken as plain strings.
fn parse_decode_option(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| "--decode-option must be in key=JSON format".to_string())?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use nc_stream::ChunkSize;
    use serde_json::json;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("nc-stream").chain(args.iter().copied()))
    }

    #[test]
    fn test_minimal_args() {
        let args = parse(&["--bucket", "meeo-s5p", "--key", "a.nc"]).unwrap();
        let loc = args.location().unwrap();
        assert_eq!(loc.to_string(), "s3://meeo-s5p/a.nc");

        let options = args.stream_options();
        assert_eq!(options, StreamOptions::default());
    }

    #[test]
    fn test_full_args() {
        let args = parse(&[
            "--bucket",
            "b",
            "--key",
            "k.nc",
            "--group",
            "/PRODUCT",
            "--engine",
            "h5netcdf",
            "--storage-option",
            "anon=true",
            "--storage-option",
            "region=eu-central-1",
            "--chunks",
            r#"{"scanline": 100}"#,
            "--decode-option",
            "mask_and_scale=false",
            "--decode-option",
            "drop_variables=latitude",
        ])
        .unwrap();

        let options = args.stream_options();
        assert_eq!(options.group.as_deref(), Some("/PRODUCT"));
        assert_eq!(options.engine.as_deref(), Some("h5netcdf"));
        assert_eq!(options.storage_options.get("anon"), Some("true"));
        assert_eq!(options.storage_options.get("region"), Some("eu-central-1"));
        match options.chunks {
            Some(Chunks::PerDimension(ref map)) => {
                assert_eq!(map.get("scanline"), Some(&ChunkSize::Fixed(100)))
            }
            ref other => panic!("unexpected chunks {:?}", other),
        }
        assert_eq!(options.decode_options["mask_and_scale"], json!(false));
        assert_eq!(options.decode_options["drop_variables"], json!("latitude"));
    }

    #[test]
    fn test_storage_option_value_may_contain_equals() {
        let args = parse(&["--bucket", "b", "--key", "k.nc", "--storage-option", "token=a=b"]).unwrap();
        assert_eq!(args.stream_options().storage_options.get("token"), Some("a=b"));
    }

    #[test]
    fn test_storage_option_without_equals_is_usage_error() {
        let err = parse(&["--bucket", "b", "--key", "k.nc", "--storage-option", "anon"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_invalid_chunks_json() {
        let err = parse(&["--bucket", "b", "--key", "k.nc", "--chunks", "{y:2"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = parse(&["--bucket", "b", "--key", "k.nc", "--chunks", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_decode_option_help_lists_supported_keys() {
        use clap::CommandFactory;

        let mut cmd = Args::command();
        let short = cmd.render_help().to_string();
        let long = cmd.render_long_help().to_string();
        for help in [short, long] {
            assert!(help.contains("--decode-option"));
            assert!(help.contains("mask_and_scale"));
            assert!(help.contains("drop_variables"));
        }
    }

    #[test]
    fn test_bucket_and_key_required() {
        let err = parse(&["--bucket", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_url_instead_of_bucket_and_key() {
        let args = parse(&["--url", "s3://b/dir/k.nc4"]).unwrap();
        let loc = args.location().unwrap();
        assert_eq!(loc.bucket, "b");
        assert_eq!(loc.key, "dir/k.nc4");

        assert!(parse(&["--url", "s3://b/k.nc", "--bucket", "b"]).is_err());
    }
}
