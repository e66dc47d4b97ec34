/// Describes a `vnp_ResponseCode` for log output.
pub fn describe(code: &str) -> &'static str {
    match code {
        "00" => "transaction successful",
        "07" => "amount debited, transaction suspected of fraud",
        "09" => "card or account not registered for internet banking",
        "10" => "card or account authentication failed more than 3 times",
        "11" => "payment window expired",
        "12" => "card or account is locked",
        "13" => "wrong one-time password",
        "24" => "customer cancelled the transaction",
        "51" => "insufficient balance",
        "65" => "daily transaction limit exceeded",
        "75" => "issuing bank under maintenance",
        "79" => "payment password entered wrong too many times",
        "99" => "other error",
        _ => "unknown response code",
    }
}
