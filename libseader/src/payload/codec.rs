// libseader-rs/libseader/src/payload/codec.rs

use iso7816_tlv::ber::Tlv;
use log::{debug, warn};

use super::der::{
    children, constructed, decode_integer, find, integer, is_tag, null, parse_one, primitive,
    primitive_value, require, single_child,
};
use super::tags::*;
use super::{
    CardDetails, ErrorResponse, FrameProtocol, NfcCommand, NfcResponse, NfcRx, NfcSend, Payload,
    Response, SamCommand,
};
use crate::constants::PAYLOAD_PREFIX_LEN;
use crate::types::Routing;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// Encode a payload behind its 6-byte routing prefix.
pub fn encode(payload: &Payload, routing: Routing) -> Result<Vec<u8>> {
    let body = encode_body(payload)?;
    let mut out = Vec::with_capacity(PAYLOAD_PREFIX_LEN + body.len());
    out.extend_from_slice(&routing.prefix());
    out.extend_from_slice(&body);
    Ok(out)
}

/// DER encoding of the payload alone
pub fn encode_body(payload: &Payload) -> Result<Vec<u8>> {
    Ok(payload_to_tlv(payload)?.to_vec())
}

/// Decode a prefixed payload. Failures are logged with the raw bytes and
/// never fall back to a default variant.
pub fn decode(bytes: &[u8]) -> Result<Payload> {
    if bytes.len() <= PAYLOAD_PREFIX_LEN {
        return Err(Error::InvalidLength {
            expected: PAYLOAD_PREFIX_LEN + 1,
            actual: bytes.len(),
        });
    }

    let result = decode_body(&bytes[PAYLOAD_PREFIX_LEN..]);
    if let Err(e) = &result {
        warn!("failed to decode payload [{}]: {}", bytes_to_hex(bytes), e);
    }
    result
}

/// Decode a DER body without prefix
pub fn decode_body(body: &[u8]) -> Result<Payload> {
    let (tlv, rest) = parse_one(body)?;
    if !rest.is_empty() {
        debug!("ignoring {} bytes after payload", rest.len());
    }
    payload_from_tlv(&tlv)
}

/// Routing addresses of a prefixed payload
pub fn routing(bytes: &[u8]) -> Result<Routing> {
    Routing::try_from(bytes)
}

fn payload_to_tlv(payload: &Payload) -> Result<Tlv> {
    match payload {
        Payload::SamCommand(cmd) => constructed(PAYLOAD_SAM_COMMAND, vec![sam_command_to_tlv(cmd)?]),
        Payload::NfcCommand(cmd) => constructed(PAYLOAD_NFC_COMMAND, vec![nfc_command_to_tlv(cmd)?]),
        Payload::Response(resp) => constructed(PAYLOAD_RESPONSE, vec![response_to_tlv(resp)?]),
        Payload::ErrorResponse(err) => constructed(
            PAYLOAD_ERROR_RESPONSE,
            vec![integer(ERROR_CODE, err.code)?, primitive(ERROR_DATA, &err.data)?],
        ),
    }
}

fn payload_from_tlv(tlv: &Tlv) -> Result<Payload> {
    if is_tag(tlv, PAYLOAD_SAM_COMMAND) {
        Ok(Payload::SamCommand(sam_command_from_tlv(single_child(tlv)?)?))
    } else if is_tag(tlv, PAYLOAD_NFC_COMMAND) {
        Ok(Payload::NfcCommand(nfc_command_from_tlv(single_child(tlv)?)?))
    } else if is_tag(tlv, PAYLOAD_RESPONSE) {
        Ok(Payload::Response(response_from_tlv(single_child(tlv)?)?))
    } else if is_tag(tlv, PAYLOAD_ERROR_RESPONSE) {
        let fields = children(tlv)?;
        let code = decode_integer(primitive_value(require(fields, ERROR_CODE, "errorCode")?)?)?;
        let data = match find(fields, ERROR_DATA) {
            Some(t) => primitive_value(t)?.to_vec(),
            None => Vec::new(),
        };
        Ok(Payload::ErrorResponse(ErrorResponse { code, data }))
    } else {
        Err(Error::Decode("unknown payload choice".into()))
    }
}

fn sam_command_to_tlv(cmd: &SamCommand) -> Result<Tlv> {
    match cmd {
        SamCommand::RequestPacs => constructed(
            SAM_REQUEST_PACS,
            vec![primitive(REQUEST_PACS_CONTENT_ELEMENT, &[CONTENT_ELEMENT_PACS_BITS])?],
        ),
        SamCommand::Version => null(SAM_VERSION),
        SamCommand::SerialNumber => null(SAM_SERIAL_NUMBER),
        SamCommand::CardDetected(details) => constructed(
            SAM_CARD_DETECTED,
            vec![constructed(CARD_DETECTED_DETAILS, card_details_fields(details)?)?],
        ),
    }
}

fn sam_command_from_tlv(tlv: &Tlv) -> Result<SamCommand> {
    if is_tag(tlv, SAM_REQUEST_PACS) {
        Ok(SamCommand::RequestPacs)
    } else if is_tag(tlv, SAM_VERSION) {
        Ok(SamCommand::Version)
    } else if is_tag(tlv, SAM_SERIAL_NUMBER) {
        Ok(SamCommand::SerialNumber)
    } else if is_tag(tlv, SAM_CARD_DETECTED) {
        let details = require(children(tlv)?, CARD_DETECTED_DETAILS, "detectedCardDetails")?;
        Ok(SamCommand::CardDetected(card_details_from_fields(children(details)?)?))
    } else {
        Err(Error::Decode("unknown SamCommand choice".into()))
    }
}

fn card_details_fields(details: &CardDetails) -> Result<Vec<Tlv>> {
    let mut fields = vec![
        primitive(CARD_CSN, &details.csn)?,
        primitive(CARD_PROTOCOL, &details.protocol.to_protocol_bytes())?,
    ];
    if let Some(sak) = details.sak {
        fields.push(primitive(CARD_SAK, &[sak])?);
    }
    if let Some(atqa) = details.atqa {
        fields.push(primitive(CARD_ATQA, &atqa)?);
    }
    Ok(fields)
}

fn card_details_from_fields(fields: &[Tlv]) -> Result<CardDetails> {
    let csn = primitive_value(require(fields, CARD_CSN, "csn")?)?.to_vec();
    let protocol = protocol_from(primitive_value(require(fields, CARD_PROTOCOL, "protocol")?)?)?;
    let sak = match find(fields, CARD_SAK) {
        Some(t) => match primitive_value(t)? {
            [sak] => Some(*sak),
            other => return Err(Error::Decode(format!("sak of {} bytes", other.len()))),
        },
        None => None,
    };
    let atqa = match find(fields, CARD_ATQA) {
        Some(t) => match primitive_value(t)? {
            [a, b] => Some([*a, *b]),
            other => return Err(Error::Decode(format!("atqa of {} bytes", other.len()))),
        },
        None => None,
    };
    Ok(CardDetails {
        csn,
        protocol,
        sak,
        atqa,
    })
}

fn protocol_from(bytes: &[u8]) -> Result<FrameProtocol> {
    match bytes {
        [_, frame] => Ok(FrameProtocol::from_byte(*frame)),
        other => Err(Error::Decode(format!("protocol of {} bytes", other.len()))),
    }
}

fn nfc_command_to_tlv(cmd: &NfcCommand) -> Result<Tlv> {
    match cmd {
        NfcCommand::Send(send) => {
            let mut fields = vec![
                primitive(NFC_SEND_DATA, &send.data)?,
                primitive(NFC_SEND_PROTOCOL, &send.protocol.to_protocol_bytes())?,
                integer(NFC_SEND_TIMEOUT, send.timeout)?,
            ];
            if let Some(format) = &send.format {
                fields.push(primitive(NFC_SEND_FORMAT, format)?);
            }
            constructed(NFC_SEND, fields)
        }
        NfcCommand::Off => null(NFC_OFF),
    }
}

fn nfc_command_from_tlv(tlv: &Tlv) -> Result<NfcCommand> {
    if is_tag(tlv, NFC_SEND) {
        let fields = children(tlv)?;
        let data = primitive_value(require(fields, NFC_SEND_DATA, "data")?)?.to_vec();
        let protocol =
            protocol_from(primitive_value(require(fields, NFC_SEND_PROTOCOL, "protocol")?)?)?;
        let timeout = decode_integer(primitive_value(require(fields, NFC_SEND_TIMEOUT, "timeOut")?)?)?;
        let format = match find(fields, NFC_SEND_FORMAT) {
            Some(t) => Some(primitive_value(t)?.to_vec()),
            None => None,
        };
        Ok(NfcCommand::Send(NfcSend {
            data,
            protocol,
            timeout,
            format,
        }))
    } else if is_tag(tlv, NFC_OFF) {
        Ok(NfcCommand::Off)
    } else {
        Err(Error::Decode("unknown NFCCommand choice".into()))
    }
}

fn response_to_tlv(resp: &Response) -> Result<Tlv> {
    match resp {
        Response::Nfc(NfcResponse::Rx(rx)) => constructed(
            RESPONSE_NFC,
            vec![constructed(
                NFC_RESPONSE_RX,
                vec![
                    primitive(NFC_RX_DATA, &rx.data)?,
                    primitive(NFC_RX_STATUS, &rx.rf_status)?,
                ],
            )?],
        ),
        Response::Nfc(NfcResponse::Ack) => constructed(RESPONSE_NFC, vec![null(NFC_RESPONSE_ACK)?]),
        Response::Sam(bytes) => primitive(RESPONSE_SAM, bytes),
    }
}

fn response_from_tlv(tlv: &Tlv) -> Result<Response> {
    if is_tag(tlv, RESPONSE_SAM) {
        return Ok(Response::Sam(primitive_value(tlv)?.to_vec()));
    }
    if !is_tag(tlv, RESPONSE_NFC) {
        return Err(Error::Decode("unknown Response choice".into()));
    }

    let inner = single_child(tlv)?;
    if is_tag(inner, NFC_RESPONSE_ACK) {
        Ok(Response::Nfc(NfcResponse::Ack))
    } else if is_tag(inner, NFC_RESPONSE_RX) {
        let fields = children(inner)?;
        let data = match find(fields, NFC_RX_DATA) {
            Some(t) => primitive_value(t)?.to_vec(),
            None => Vec::new(),
        };
        let rf_status = match primitive_value(require(fields, NFC_RX_STATUS, "rfStatus")?)? {
            [a, b] => [*a, *b],
            other => return Err(Error::Decode(format!("rfStatus of {} bytes", other.len()))),
        };
        Ok(Response::Nfc(NfcResponse::Rx(NfcRx { data, rf_status })))
    } else {
        Err(Error::Decode("unknown NFCResponse choice".into()))
    }
}
