//! RSA-SHA256 signing and verification over canonical payload strings

use super::PaymentError;
use ring::{rand as ring_rand, signature};
use rsa::RsaPublicKey;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use x509_parser::prelude::*;

const RSA_OID: &str = "1.2.840.113549.1.1.1";

/// A loaded RSA signing key (PKCS#8)
pub struct SigningKey {
    key_pair: signature::RsaKeyPair,
    rng: ring_rand::SystemRandom,
}

impl SigningKey {
    pub fn from_pem(pem_str: &str) -> Result<Self, PaymentError> {
        let der = decode_pem(pem_str, "PRIVATE KEY")?;
        let key_pair = signature::RsaKeyPair::from_pkcs8(&der)
            .map_err(|e| PaymentError::InvalidKey(format!("Invalid RSA private key: {e}")))?;
        Ok(Self {
            key_pair,
            rng: ring_rand::SystemRandom::new(),
        })
    }

    /// Sign `data` with RSASSA-PKCS1-v1_5 over SHA-256
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, PaymentError> {
        let mut sig = vec![0; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(&signature::RSA_PKCS1_SHA256, &self.rng, data, &mut sig)
            .map_err(|e| PaymentError::Signing(e.to_string()))?;
        Ok(sig)
    }
}

/// A loaded RSA verification key, stored as PKCS#1 DER
pub struct VerifyingKey {
    pkcs1_der: Vec<u8>,
}

impl VerifyingKey {
    /// Accepts either an X.509 `CERTIFICATE` PEM or a bare SPKI `PUBLIC KEY` PEM
    pub fn from_pem(pem_str: &str) -> Result<Self, PaymentError> {
        if pem_str.contains("BEGIN CERTIFICATE") {
            Self::from_certificate_pem(pem_str)
        } else {
            Self::from_public_key_pem(pem_str)
        }
    }

    fn from_certificate_pem(cert_pem: &str) -> Result<Self, PaymentError> {
        let (_, pem) = parse_x509_pem(cert_pem.as_bytes())
            .map_err(|e| PaymentError::InvalidKey(format!("PEM parse error: {e}")))?;
        let (_, x509) = x509_parser::parse_x509_certificate(&pem.contents)
            .map_err(|e| PaymentError::InvalidKey(format!("X509 parse error: {e}")))?;

        let spki = x509.tbs_certificate.subject_pki;
        let oid = spki.algorithm.algorithm.to_id_string();
        if oid != RSA_OID {
            return Err(PaymentError::InvalidKey(format!(
                "Unsupported certificate algorithm OID: {oid}"
            )));
        }

        Ok(Self {
            pkcs1_der: spki.subject_public_key.data.to_vec(),
        })
    }

    fn from_public_key_pem(pem_str: &str) -> Result<Self, PaymentError> {
        let public_key = RsaPublicKey::from_public_key_pem(pem_str)
            .map_err(|e| PaymentError::InvalidKey(format!("Invalid RSA public key: {e}")))?;
        let der = public_key
            .to_pkcs1_der()
            .map_err(|e| PaymentError::InvalidKey(format!("PKCS#1 encode failed: {e}")))?;
        Ok(Self {
            pkcs1_der: der.as_bytes().to_vec(),
        })
    }

    /// Verify an RSASSA-PKCS1-v1_5 SHA-256 signature over `data`
    pub fn verify(&self, data: &[u8], sig: &[u8]) -> Result<(), PaymentError> {
        let key = signature::UnparsedPublicKey::new(
            &signature::RSA_PKCS1_2048_8192_SHA256,
            &self.pkcs1_der,
        );
        key.verify(data, sig)
            .map_err(|_| PaymentError::SignatureInvalid("RSA signature mismatch".into()))
    }
}

fn decode_pem(pem_str: &str, tag: &str) -> Result<Vec<u8>, PaymentError> {
    let pems = ::pem::parse_many(pem_str)
        .map_err(|e| PaymentError::InvalidKey(format!("PEM parse error: {e}")))?;

    for p in pems {
        if p.tag() == tag {
            return Ok(p.into_contents());
        }
    }

    Err(PaymentError::InvalidKey(format!("PEM tag '{tag}' not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::RsaPrivateKey;
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

    fn test_keys() -> (String, String) {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public = private.to_public_key();
        (
            private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            public.to_public_key_pem(LineEnding::LF).unwrap(),
        )
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let (private_pem, public_pem) = test_keys();
        let signer = SigningKey::from_pem(&private_pem).unwrap();
        let verifier = VerifyingKey::from_pem(&public_pem).unwrap();

        let data = b"amount=11.98&currency=EUR&order_id=x1";
        let sig = signer.sign(data).unwrap();
        verifier.verify(data, &sig).unwrap();
    }

    #[test]
    fn test_tampered_data_rejected() {
        let (private_pem, public_pem) = test_keys();
        let signer = SigningKey::from_pem(&private_pem).unwrap();
        let verifier = VerifyingKey::from_pem(&public_pem).unwrap();

        let sig = signer.sign(b"amount=11.98").unwrap();
        let err = verifier.verify(b"amount=99.98", &sig).unwrap_err();
        assert!(matches!(err, PaymentError::SignatureInvalid(_)));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let (private_pem, public_pem) = test_keys();
        let signer = SigningKey::from_pem(&private_pem).unwrap();
        let verifier = VerifyingKey::from_pem(&public_pem).unwrap();

        let mut sig = signer.sign(b"amount=11.98").unwrap();
        sig[0] ^= 0xFF;
        assert!(verifier.verify(b"amount=11.98", &sig).is_err());
    }

    #[test]
    fn test_garbage_key_rejected() {
        assert!(SigningKey::from_pem("not a pem").is_err());
        assert!(VerifyingKey::from_pem("not a pem").is_err());
    }
}
