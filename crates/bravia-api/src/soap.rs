// SOAP helpers for the IRCC service
//
// Bravia answers a failed request with a SOAP fault envelope. Only the
// UPnP `errorDescription` is of interest; everything else is noise.

use thiserror::Error;
use xmltree::{Element, EmitterConfig, XMLNode};

/// SOAP envelope namespace.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP encoding style attached to IRCC envelopes.
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// IRCC service type, used as the action namespace.
pub const IRCC_SERVICE: &str = "urn:schemas-sony-com:service:IRCC:1";

/// Path from the envelope root to the fault description, by local name.
const FAULT_PATH: [&str; 5] = ["Body", "Fault", "detail", "UPnPError", "errorDescription"];

/// Why a fault description could not be extracted.
#[derive(Debug, Error)]
pub enum FaultError {
    /// Valid XML without the expected fault path. `parsed` is the tree,
    /// re-serialized for diagnostics.
    #[error("malformed fault: {parsed}")]
    Malformed { parsed: String },

    #[error("XML parse error: {0}")]
    Unparsable(#[from] xmltree::ParseError),
}

/// Extract `Envelope/Body/Fault/detail/UPnPError/errorDescription`.
pub fn extract_fault_description(body: &str) -> Result<String, FaultError> {
    let root = Element::parse(body.as_bytes())?;

    let description = (root.name == "Envelope")
        .then_some(&root)
        .and_then(|envelope| {
            FAULT_PATH
                .iter()
                .try_fold(envelope, |elem, name| elem.get_child(*name))
        })
        .and_then(Element::get_text);

    match description {
        Some(text) => Ok(text.into_owned()),
        None => Err(FaultError::Malformed {
            parsed: render(&root),
        }),
    }
}

fn render(elem: &Element) -> String {
    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .perform_indent(false)
        .write_document_declaration(false);
    match elem.write_with_config(&mut buf, config) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("<{}>", elem.name),
    }
}

fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.to_owned()));
    elem
}

/// Build the `X_SendIRCC` envelope for a remote-control code.
///
/// Sent with the default `SOAPACTION` header, so no override is needed.
pub fn ircc_envelope(code: &str) -> String {
    let mut action = Element::new("u:X_SendIRCC");
    action
        .attributes
        .insert("xmlns:u".to_string(), IRCC_SERVICE.to_string());
    action
        .children
        .push(XMLNode::Element(text_element("IRCCCode", code)));

    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(action));

    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), SOAP_ENVELOPE_NS.to_string());
    envelope
        .attributes
        .insert("s:encodingStyle".to_string(), SOAP_ENCODING_STYLE.to_string());
    envelope.children.push(XMLNode::Element(body));

    render(&envelope)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FAULT: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>800</errorCode>
          <errorDescription>Cannot accept the IRCC Code</errorDescription>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn test_extract_upnp_description() {
        let description = extract_fault_description(FAULT).unwrap();
        assert_eq!(description, "Cannot accept the IRCC Code");
    }

    #[test]
    fn test_description_text_is_not_trimmed() {
        let xml = FAULT.replace(
            "<errorDescription>Cannot accept the IRCC Code</errorDescription>",
            "<errorDescription>  Invalid Action </errorDescription>",
        );
        assert_eq!(extract_fault_description(&xml).unwrap(), "  Invalid Action ");
    }

    #[test]
    fn test_missing_detail_is_malformed() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body><s:Fault><faultcode>s:Server</faultcode></s:Fault></s:Body>
</s:Envelope>"#;

        match extract_fault_description(xml) {
            Err(FaultError::Malformed { parsed }) => {
                assert!(parsed.contains("faultcode"), "got: {parsed}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_root_is_malformed() {
        let result = extract_fault_description("<html><body>500</body></html>");
        assert!(matches!(result, Err(FaultError::Malformed { .. })));
    }

    #[test]
    fn test_plain_text_is_unparsable() {
        let result = extract_fault_description("Internal Server Error");
        assert!(matches!(result, Err(FaultError::Unparsable(_))));

        let empty = extract_fault_description("");
        assert!(matches!(empty, Err(FaultError::Unparsable(_))));
    }

    #[test]
    fn test_ircc_envelope() {
        let xml = ircc_envelope("AAAAAQAAAAEAAAAVAw==");

        assert!(xml.contains("<s:Envelope"));
        assert!(xml.contains("<u:X_SendIRCC"));
        assert!(xml.contains(IRCC_SERVICE));
        assert!(xml.contains("<IRCCCode>AAAAAQAAAAEAAAAVAw==</IRCCCode>"));

        let parsed = Element::parse(xml.as_bytes()).unwrap();
        let code = parsed
            .get_child("Body")
            .and_then(|b| b.get_child("X_SendIRCC"))
            .and_then(|a| a.get_child("IRCCCode"))
            .and_then(Element::get_text)
            .unwrap();
        assert_eq!(code, "AAAAAQAAAAEAAAAVAw==");
    }
}
