//! Certificate generation and a one-shot TLS echo server for integration tests.

#![allow(dead_code)]

use boring::asn1::Asn1Time;
use boring::bn::BigNum;
use boring::ec::{EcGroup, EcKey};
use boring::hash::MessageDigest;
use boring::nid::Nid;
use boring::pkey::{PKey, Private};
use boring::ssl::{select_next_proto, AlpnError, SslAcceptor, SslMethod};
use boring::x509::extension::{BasicConstraints, KeyUsage, SubjectAlternativeName};
use boring::x509::{X509NameBuilder, X509};
use keypin::{spki_hash, Fingerprint};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

static SERIAL: AtomicU32 = AtomicU32::new(1);

pub struct TestCert {
    pub cert: X509,
    pub key: PKey<Private>,
}

impl TestCert {
    pub fn fingerprint(&self) -> Fingerprint {
        spki_hash(&self.cert).unwrap()
    }
}

fn ec_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn build(cn: &str, key: &PKey<Private>, issuer: Option<&TestCert>, is_ca: bool) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", cn).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(SERIAL.fetch_add(1, Ordering::Relaxed))
        .unwrap()
        .to_asn1_integer()
        .unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    match issuer {
        Some(ca) => builder.set_issuer_name(ca.cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&name).unwrap(),
    }
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(7).unwrap())
        .unwrap();

    if is_ca {
        let constraints = BasicConstraints::new().critical().ca().build().unwrap();
        builder.append_extension(constraints).unwrap();
        let usage = KeyUsage::new()
            .critical()
            .key_cert_sign()
            .crl_sign()
            .build()
            .unwrap();
        builder.append_extension(usage).unwrap();
    } else {
        let san = SubjectAlternativeName::new()
            .dns("localhost")
            .ip("127.0.0.1")
            .build(&builder.x509v3_context(issuer.map(|ca| &*ca.cert), None))
            .unwrap();
        builder.append_extension(san).unwrap();
    }

    let signing_key = issuer.map(|ca| &ca.key).unwrap_or(key);
    builder.sign(signing_key, MessageDigest::sha256()).unwrap();
    builder.build()
}

/// Self-signed end-entity certificate valid for `localhost` and `127.0.0.1`.
pub fn self_signed(cn: &str) -> TestCert {
    let key = ec_key();
    let cert = build(cn, &key, None, false);
    TestCert { cert, key }
}

pub fn certificate_authority(cn: &str) -> TestCert {
    let key = ec_key();
    let cert = build(cn, &key, None, true);
    TestCert { cert, key }
}

/// End-entity certificate for `localhost` issued by `ca`.
pub fn issued_by(ca: &TestCert, cn: &str) -> TestCert {
    let key = ec_key();
    let cert = build(cn, &key, Some(ca), false);
    TestCert { cert, key }
}

/// What the server observed on its single connection.
#[derive(Debug)]
pub struct ServerReport {
    pub handshake_ok: bool,
    pub echoed: usize,
}

/// Accept one TLS connection presenting `leaf` followed by `extra_chain`,
/// echo everything it reads, and report once the client goes away.
pub async fn spawn_server(
    leaf: &TestCert,
    extra_chain: &[&TestCert],
) -> (SocketAddr, JoinHandle<ServerReport>) {
    let mut acceptor = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).unwrap();
    acceptor.set_private_key(&leaf.key).unwrap();
    acceptor.set_certificate(&leaf.cert).unwrap();
    for extra in extra_chain {
        acceptor.add_extra_chain_cert(extra.cert.clone()).unwrap();
    }
    acceptor.check_private_key().unwrap();
    acceptor.set_alpn_select_callback(|_, client| {
        select_next_proto(b"\x08http/1.1", client).ok_or(AlpnError::NOACK)
    });
    let acceptor = acceptor.build();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut stream = match tokio_boring::accept(&acceptor, tcp).await {
            Ok(stream) => stream,
            Err(_) => {
                return ServerReport {
                    handshake_ok: false,
                    echoed: 0,
                }
            }
        };

        let mut echoed = 0;
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if stream.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                    echoed += n;
                }
            }
        }

        ServerReport {
            handshake_ok: true,
            echoed,
        }
    });

    (addr, handle)
}
