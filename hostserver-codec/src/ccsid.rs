//! CCSID to encoding-name table
//!
//! The names follow the converter names host servers and existing clients
//! agree on; the table must stay verbatim for interoperability. Whether a
//! named encoding can actually be converted is decided separately by
//! [`crate::text::TextEncoding::resolve`].

/// CCSID of UTF-16 big endian text
pub const CCSID_UTF16: u32 = 1200;
/// CCSID of UTF-8 text
pub const CCSID_UTF8: u32 = 1208;
/// CCSID of US/Canada EBCDIC
pub const CCSID_EBCDIC_US: u32 = 37;
/// "No conversion" marker returned by some hosts
pub const CCSID_HEX: u32 = 65535;

/// CCSID to encoding name, sorted by CCSID
pub static CCSID_ENCODINGS: &[(u32, &str)] = &[
    (37, "Cp037"),
    (273, "Cp273"),
    (277, "Cp277"),
    (278, "Cp278"),
    (280, "Cp280"),
    (284, "Cp284"),
    (285, "Cp285"),
    (290, "Cp290"),
    (297, "Cp297"),
    (300, "Cp300"),
    (367, "ASCII"),
    (420, "Cp420"),
    (423, "Cp423"),
    (424, "Cp424"),
    (437, "Cp437"),
    (500, "Cp500"),
    (737, "Cp737"),
    (775, "Cp775"),
    (813, "ISO8859_7"),
    (819, "ISO8859_1"),
    (833, "Cp833"),
    (834, "Cp834"),
    (835, "Cp835"),
    (836, "Cp836"),
    (837, "Cp837"),
    (838, "Cp838"),
    (850, "Cp850"),
    (852, "Cp852"),
    (855, "Cp855"),
    (856, "Cp856"),
    (857, "Cp857"),
    (858, "Cp858"),
    (860, "Cp860"),
    (861, "Cp861"),
    (862, "Cp862"),
    (863, "Cp863"),
    (864, "Cp864"),
    (865, "Cp865"),
    (866, "Cp866"),
    (868, "Cp868"),
    (869, "Cp869"),
    (870, "Cp870"),
    (871, "Cp871"),
    (874, "MS874"),
    (875, "Cp875"),
    (878, "KOI8_R"),
    (880, "Cp880"),
    (905, "Cp905"),
    (912, "ISO8859_2"),
    (913, "ISO8859_3"),
    (914, "ISO8859_4"),
    (915, "ISO8859_5"),
    (916, "ISO8859_8"),
    (918, "Cp918"),
    (920, "ISO8859_9"),
    (921, "Cp921"),
    (922, "Cp922"),
    (923, "ISO8859_15"),
    (930, "Cp930"),
    (933, "Cp933"),
    (935, "Cp935"),
    (937, "Cp937"),
    (939, "Cp939"),
    (942, "Cp942"),
    (943, "Cp943"),
    (948, "Cp948"),
    (949, "Cp949"),
    (950, "Big5"),
    (954, "EUC_JP"),
    (964, "Cp964"),
    (970, "EUC_KR"),
    (1006, "Cp1006"),
    (1025, "Cp1025"),
    (1026, "Cp1026"),
    (1027, "Cp1027"),
    (1046, "Cp1046"),
    (1047, "Cp1047"),
    (1089, "ISO8859_6"),
    (1097, "Cp1097"),
    (1098, "Cp1098"),
    (1112, "Cp1112"),
    (1122, "Cp1122"),
    (1123, "Cp1123"),
    (1124, "Cp1124"),
    (1125, "Cp1125"),
    (1129, "Cp1129"),
    (1130, "Cp1130"),
    (1131, "Cp1131"),
    (1132, "Cp1132"),
    (1133, "Cp1133"),
    (1137, "Cp1137"),
    (1140, "Cp1140"),
    (1141, "Cp1141"),
    (1142, "Cp1142"),
    (1143, "Cp1143"),
    (1144, "Cp1144"),
    (1145, "Cp1145"),
    (1146, "Cp1146"),
    (1147, "Cp1147"),
    (1148, "Cp1148"),
    (1149, "Cp1149"),
    (1153, "Cp1153"),
    (1154, "Cp1154"),
    (1155, "Cp1155"),
    (1156, "Cp1156"),
    (1157, "Cp1157"),
    (1158, "Cp1158"),
    (1160, "Cp1160"),
    (1164, "Cp1164"),
    (1200, "UTF-16BE"),
    (1208, "UTF-8"),
    (1250, "Cp1250"),
    (1251, "Cp1251"),
    (1252, "Cp1252"),
    (1253, "Cp1253"),
    (1254, "Cp1254"),
    (1255, "Cp1255"),
    (1256, "Cp1256"),
    (1257, "Cp1257"),
    (1258, "Cp1258"),
    (1275, "MacRoman"),
    (1280, "MacGreek"),
    (1281, "MacTurkish"),
    (1282, "MacCentralEurope"),
    (1283, "MacCyrillic"),
    (1364, "Cp1364"),
    (1371, "Cp1371"),
    (1381, "Cp1381"),
    (1383, "GB2312"),
    (1386, "GBK"),
    (1388, "Cp1388"),
    (1390, "Cp1390"),
    (1399, "Cp1399"),
    (4396, "Cp930"),
    (4930, "Cp4930"),
    (4933, "Cp933"),
    (4948, "Cp948"),
    (4951, "Cp4951"),
    (5026, "Cp930"),
    (5035, "Cp939"),
    (5050, "EUC_JP"),
    (5054, "Cp5054"),
    (5123, "Cp1027"),
    (5233, "Cp5233"),
    (5348, "Cp1252"),
    (5488, "GB18030"),
    (8612, "Cp420"),
    (9066, "MS874"),
    (12708, "Cp420"),
    (13121, "Cp1364"),
    (13124, "Cp1388"),
    (13488, "UTF-16BE"),
    (16684, "Cp1390"),
    (17354, "Cp1364"),
    (17584, "UTF-16BE"),
    (28709, "Cp037"),
    (33722, "Cp33722"),
    (61952, "UTF-16BE"),
    (62211, "Cp424"),
    (62224, "Cp420"),
    (62235, "Cp424"),
];

/// Encoding name for a CCSID, if the CCSID is known
pub fn encoding_name(ccsid: u32) -> Option<&'static str> {
    CCSID_ENCODINGS
        .binary_search_by_key(&ccsid, |&(c, _)| c)
        .ok()
        .map(|i| CCSID_ENCODINGS[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted_and_unique() {
        for pair in CCSID_ENCODINGS.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} before {}", pair[0].0, pair[1].0);
        }
        assert!(CCSID_ENCODINGS.len() >= 130);
    }

    #[test]
    fn test_well_known_entries() {
        assert_eq!(encoding_name(37), Some("Cp037"));
        assert_eq!(encoding_name(1208), Some("UTF-8"));
        assert_eq!(encoding_name(943), Some("Cp943"));
        assert_eq!(encoding_name(13488), Some("UTF-16BE"));
        assert_eq!(encoding_name(CCSID_HEX), None);
        assert_eq!(encoding_name(0), None);
    }
}
