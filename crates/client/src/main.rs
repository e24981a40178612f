use std::sync::Arc;

use clap::{Parser, ValueEnum};
use eyre::{WrapErr, eyre};
use http::Method;
use tc_signer::{ApiClient, ClientProfile, ContentType, Credential, HyperTransport, ServiceDescriptor};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, ValueEnum)]
enum BodyEncoding {
    Form,
    Json,
    Multipart,
}

impl From<BodyEncoding> for ContentType {
    fn from(encoding: BodyEncoding) -> Self {
        match encoding {
            BodyEncoding::Form => ContentType::FormUrlEncoded,
            BodyEncoding::Json => ContentType::Json,
            BodyEncoding::Multipart => ContentType::Multipart,
        }
    }
}

/// Signs and sends a single API call, printing the raw response.
#[derive(Parser)]
struct Args {
    /// Action name, e.g. DescribeInstances.
    action: String,
    /// Request parameters as a JSON object.
    #[clap(long, default_value = "{}")]
    params: String,

    #[clap(long, env = "TENCENTCLOUD_SECRET_ID")]
    secret_id: String,
    #[clap(long, env = "TENCENTCLOUD_SECRET_KEY", hide_env_values = true)]
    secret_key: String,
    #[clap(long, env = "TENCENTCLOUD_SESSION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[clap(long, env = "TENCENTCLOUD_REGION", default_value = "")]
    region: String,
    #[clap(long, default_value = "cvm.tencentcloudapi.com")]
    endpoint: String,
    #[clap(long, default_value = "2017-03-12")]
    api_version: String,
    #[clap(long, default_value = "form")]
    content_type: BodyEncoding,

    #[clap(long, default_value = "POST")]
    method: String,
    #[clap(long, default_value = "TC3-HMAC-SHA256")]
    sign_method: String,
    #[clap(long, default_value = "60")]
    timeout: u64,
    #[clap(long)]
    unsigned_payload: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let params: serde_json::Value =
        serde_json::from_str(&args.params).wrap_err("--params is not valid JSON")?;

    let mut credential = Credential::new(args.secret_id, args.secret_key);
    if let Some(token) = args.token {
        credential = credential.with_token(token);
    }

    let method = args
        .method
        .to_ascii_uppercase()
        .parse::<Method>()
        .map_err(|_| eyre!("invalid HTTP method {:?}", args.method))?;
    let mut profile = ClientProfile::default()
        .with_sign_method(&args.sign_method)?
        .with_http_method(method)
        .with_unsigned_payload(args.unsigned_payload);
    profile.http.timeout_secs = args.timeout;

    let service = ServiceDescriptor::new(args.endpoint, args.api_version)
        .with_content_type(args.content_type.into());

    let client = ApiClient::new(
        credential,
        args.region,
        profile,
        service,
        Arc::new(HyperTransport::new()),
    )?;

    info!(action = %args.action, endpoint = client.endpoint(), "calling");
    let response = client
        .call(&args.action, &params)
        .await
        .wrap_err_with(|| format!("{} failed", args.action))?;
    println!("{response}");
    Ok(())
}
