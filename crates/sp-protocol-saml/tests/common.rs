//! Common test utilities and fixtures.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use sp_protocol_saml::bindings::{
    saml_message_type, Binding, HttpInTransport, HttpPostBinding, HttpRedirectBinding,
    MessageDecoder, MessageEncoder,
};
use sp_protocol_saml::credential::Credential;
use sp_protocol_saml::metadata::{EntityMetadataSource, InMemoryMetadataSource};
use sp_protocol_saml::signature::{SignatureAlgorithm, SignatureVerifier, XmlSignature};
use sp_protocol_saml::{
    EntityRole, MessageContext, MessageProcessor, SamlError, SamlMessage, SamlResult,
    ServiceProviderConfig, SAMLP_NS,
};

pub const SP: &str = "https://sp.example.org";
pub const IDP: &str = "https://idp.example.org";

/// DER bytes of the certificate the IdP publishes in metadata.
pub const IDP_CERT_DER: &[u8] = &[1, 2, 3];

pub const CONFIG: &str = r#"{
    "entity_id": "https://sp.example.org",
    "entities": [
        {
            "entity_id": "https://sp.example.org",
            "roles": [{
                "role": "service_provider",
                "endpoints": [{
                    "binding": "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
                    "location": "https://sp.example.org/acs"
                }]
            }]
        },
        {
            "entity_id": "https://idp.example.org",
            "roles": [{
                "role": "identity_provider",
                "key_descriptors": [{ "use": "signing", "certificate": "AQID" }],
                "endpoints": [
                    {
                        "binding": "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
                        "location": "https://idp.example.org/sso"
                    },
                    {
                        "binding": "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
                        "location": "https://idp.example.org/soap"
                    }
                ]
            }]
        }
    ],
    "signing_key": { "private_key": "BwcH", "certificate": "CQkJ" }
}"#;

/// Installs a test subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sp_protocol_saml=debug")
        .with_test_writer()
        .try_init();
}

/// Accepts a signature whose value is the base64 of the verifying
/// certificate.
pub struct CertificateEchoVerifier;

impl SignatureVerifier for CertificateEchoVerifier {
    fn verify(&self, signature: &XmlSignature, credential: &Credential) -> SamlResult<bool> {
        Ok(credential
            .certificate_der
            .as_ref()
            .is_some_and(|der| STANDARD.encode(der) == signature.signature_value))
    }
}

/// Signature value the verifier accepts for `certificate_der`.
pub fn sign_with(certificate_der: &[u8]) -> String {
    STANDARD.encode(certificate_der)
}

/// Decoder for base64 form and query parameters.
///
/// Reads `SAMLRequest`/`SAMLResponse`, `Signature`, `SigAlg` and
/// `RelayState`, evaluates the security policy, then attaches the issuer's
/// metadata.
pub struct FormDecoder {
    metadata: Arc<dyn EntityMetadataSource>,
}

fn between<'a>(xml: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = xml.find(start)? + start.len();
    let len = xml[from..].find(end)?;
    Some(&xml[from..from + len])
}

impl MessageDecoder for FormDecoder {
    fn decode(&self, ctx: &mut MessageContext) -> SamlResult<()> {
        let transport = ctx
            .inbound_transport()
            .ok_or_else(|| SamlError::Decoding("no inbound transport".to_string()))?;
        let kind = saml_message_type(transport)
            .ok_or_else(|| SamlError::Decoding("no SAML message parameter".to_string()))?;
        let encoded = transport.parameter(kind.form_param()).unwrap_or_default();
        let xml = STANDARD
            .decode(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| SamlError::Decoding("message is not base64 UTF-8".to_string()))?;

        let id = between(&xml, "ID=\"", "\"")
            .ok_or_else(|| SamlError::Decoding("message has no ID".to_string()))?
            .to_string();
        let signature = transport.parameter("Signature").map(|value| XmlSignature {
            algorithm: transport
                .parameter("SigAlg")
                .and_then(SignatureAlgorithm::from_uri)
                .unwrap_or(SignatureAlgorithm::RsaSha256),
            reference_uri: format!("#{id}"),
            signed_info: encoded.to_string(),
            signature_value: value.to_string(),
            x509_certificate: None,
        });
        let relay_state = transport.parameter("RelayState").map(str::to_string);

        let mut message = SamlMessage::new(id, xml.clone());
        if let Some(issuer) = between(&xml, "<saml:Issuer>", "</saml:Issuer>") {
            message = message.with_issuer(issuer);
        }
        if let Some(signature) = signature {
            message = message.with_signature(signature);
        }
        let issuer = message.issuer.clone();

        ctx.inbound_message = Some(message);
        ctx.relay_state = relay_state;
        ctx.evaluate_security_policy()?;

        if let Some(issuer) = issuer {
            ctx.peer_entity_metadata = self.metadata.entity_descriptor(&issuer)?;
            ctx.peer_entity_role_metadata =
                self.metadata
                    .role_descriptor(&issuer, EntityRole::IdentityProvider, SAMLP_NS)?;
        }
        Ok(())
    }
}

/// A message handed to the encoder.
#[derive(Debug, Clone)]
pub struct Sent {
    pub binding: Option<String>,
    pub location: Option<String>,
    pub payload: String,
    pub signing_credential: Option<Credential>,
    pub relay_state: Option<String>,
}

/// Encoder recording everything it is asked to send.
#[derive(Default)]
pub struct RecordingEncoder {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingEncoder {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

impl MessageEncoder for RecordingEncoder {
    fn encode(&self, ctx: &mut MessageContext) -> SamlResult<()> {
        let message = ctx
            .outbound_message
            .as_ref()
            .ok_or_else(|| SamlError::Encoding("no outbound message".to_string()))?;
        self.sent.lock().unwrap().push(Sent {
            binding: ctx.communication_profile_id.clone(),
            location: ctx.peer_entity_endpoint.as_ref().map(|e| e.location.clone()),
            payload: STANDARD.encode(&message.xml),
            signing_credential: ctx.outbound_signing_credential.clone(),
            relay_state: ctx.relay_state.clone(),
        });
        Ok(())
    }
}

/// Test environment holding a processor built from configuration.
pub struct TestEnv {
    pub processor: MessageProcessor,
    pub encoder: Arc<RecordingEncoder>,
    pub config: ServiceProviderConfig,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_json(CONFIG)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        init_tracing();

        let config = ServiceProviderConfig::from_json_str(json)?;
        let decoder = Arc::new(FormDecoder {
            metadata: Arc::new(InMemoryMetadataSource::from_config(&config)),
        });
        let encoder = Arc::new(RecordingEncoder::default());

        let bindings: Vec<Arc<dyn Binding>> = vec![
            Arc::new(HttpPostBinding::new(decoder.clone(), encoder.clone())),
            Arc::new(HttpRedirectBinding::new(decoder, encoder.clone())),
        ];
        let processor =
            MessageProcessor::from_config(&config, Arc::new(CertificateEchoVerifier), bindings)?;

        Ok(Self {
            processor,
            encoder,
            config,
        })
    }
}

pub fn response_xml(id: &str, issuer: &str) -> String {
    format!(
        r#"<samlp:Response ID="{id}" Version="2.0"><saml:Issuer>{issuer}</saml:Issuer></samlp:Response>"#
    )
}

/// A `GET` carrying a redirect-bound message, signed with RSA-SHA256 when a
/// signature is given.
pub fn redirect_transport(xml: &str, signature: Option<&str>) -> HttpInTransport {
    match signature {
        Some(signature) => signed_redirect_transport(xml, SignatureAlgorithm::RsaSha256, signature),
        None => HttpInTransport::new("GET").with_parameter("SAMLResponse", STANDARD.encode(xml)),
    }
}

pub fn signed_redirect_transport(
    xml: &str,
    algorithm: SignatureAlgorithm,
    signature: &str,
) -> HttpInTransport {
    HttpInTransport::new("GET")
        .with_parameter("SAMLResponse", STANDARD.encode(xml))
        .with_parameter("SigAlg", algorithm.uri())
        .with_parameter("Signature", signature)
}

/// A `POST` carrying a form-bound message.
pub fn post_transport(xml: &str) -> HttpInTransport {
    HttpInTransport::new("POST")
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_parameter("SAMLResponse", STANDARD.encode(xml))
}
