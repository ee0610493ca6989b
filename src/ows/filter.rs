//! OGC Filter Encoding 1.1 expressions for WFS 1.1.0 GetFeature requests.

use crate::types::bbox::Bbox;
use quick_xml::escape::escape;

const OGC_NAMESPACE: &str = "http://www.opengis.net/ogc";
const GML_NAMESPACE: &str = "http://www.opengis.net/gml";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    Bbox {
        property: String,
        bbox: Bbox,
    },
    Between {
        property: String,
        lower: String,
        upper: String,
    },
    EqualTo {
        property: String,
        value: String,
    },
}

impl Predicate {
    fn write(&self, out: &mut String) {
        match self {
            Predicate::Bbox { property, bbox } => {
                out.push_str("<ogc:BBOX>");
                push_property_name(out, property);
                out.push_str(&format!(
                    "<gml:Envelope><gml:lowerCorner>{} {}</gml:lowerCorner><gml:upperCorner>{} {}</gml:upperCorner></gml:Envelope>",
                    bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
                ));
                out.push_str("</ogc:BBOX>");
            }
            Predicate::Between {
                property,
                lower,
                upper,
            } => {
                out.push_str("<ogc:PropertyIsBetween>");
                push_property_name(out, property);
                out.push_str("<ogc:LowerBoundary>");
                push_literal(out, lower);
                out.push_str("</ogc:LowerBoundary><ogc:UpperBoundary>");
                push_literal(out, upper);
                out.push_str("</ogc:UpperBoundary></ogc:PropertyIsBetween>");
            }
            Predicate::EqualTo { property, value } => {
                out.push_str("<ogc:PropertyIsEqualTo>");
                push_property_name(out, property);
                push_literal(out, value);
                out.push_str("</ogc:PropertyIsEqualTo>");
            }
        }
    }
}

fn push_property_name(out: &mut String, property: &str) {
    out.push_str("<ogc:PropertyName>");
    out.push_str(&escape(property));
    out.push_str("</ogc:PropertyName>");
}

fn push_literal(out: &mut String, value: &str) {
    out.push_str("<ogc:Literal>");
    out.push_str(&escape(value));
    out.push_str("</ogc:Literal>");
}

/// Serializes the predicates into a single `ogc:Filter`, joined with `ogc:And` when
/// there is more than one. Returns `None` when there is nothing to filter on.
pub(crate) fn build_filter(predicates: &[Predicate]) -> Option<String> {
    if predicates.is_empty() {
        return None;
    }
    let mut out = format!(
        "<ogc:Filter xmlns:ogc=\"{OGC_NAMESPACE}\" xmlns:gml=\"{GML_NAMESPACE}\">"
    );
    if let [single] = predicates {
        single.write(&mut out);
    } else {
        out.push_str("<ogc:And>");
        for predicate in predicates {
            predicate.write(&mut out);
        }
        out.push_str("</ogc:And>");
    }
    out.push_str("</ogc:Filter>");
    Some(out)
}
