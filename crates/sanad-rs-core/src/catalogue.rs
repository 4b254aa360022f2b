//! Clarification-question catalogue per document type.

use crate::types::DocType;

/// Fallback questions for labels outside the catalogue.
const GENERIC_QUESTIONS: &[&str] = &[
    "ما اسم الطرف الآخر في المستند؟",
    "ما هي التفاصيل الأساسية المطلوب ذكرها؟",
    "ما التواريخ والمبالغ ذات الصلة؟",
    "هل هناك شروط خاصة تود إضافتها؟",
];

/// Extra question appended when similar past conversations exist.
pub const REUSE_QUESTION: &str =
    "لاحظت أن لديك تفاصيل مشابهة في مستندات سابقة، هل ترغب في إعادة استخدامها؟";

/// Ordered clarification questions for a document-type label.
///
/// Unknown labels fall back to the generic list.
pub fn questions_for(doc_type: &str) -> &'static [&'static str] {
    let Some(doc_type) = DocType::parse(doc_type) else {
        return GENERIC_QUESTIONS;
    };
    match doc_type {
        DocType::ScaffoldRental => &[
            "ما اسم المستأجر ورقم سجله التجاري؟",
            "ما كمية السقالات المطلوبة ونوعها؟",
            "ما مدة الإيجار وتاريخ بدء العقد؟",
            "ما قيمة الإيجار وطريقة السداد؟",
            "ما موقع التركيب وعنوان المشروع؟",
        ],
        DocType::LaborContract => &[
            "ما اسم العامل وجنسيته ورقم هويته؟",
            "ما المسمى الوظيفي وطبيعة العمل؟",
            "ما الراتب الأساسي والبدلات؟",
            "ما مدة العقد وتاريخ المباشرة؟",
            "ما ساعات العمل وأيام الراحة؟",
        ],
        DocType::DeliveryNote => &[
            "ما اسم المستلم وجهته؟",
            "ما المواد المسلمة وكمياتها؟",
            "ما تاريخ التسليم؟",
            "ما موقع التسليم؟",
        ],
        DocType::ReturnNote => &[
            "ما اسم الجهة المرجعة؟",
            "ما المواد المرجعة وكمياتها؟",
            "ما تاريخ الإرجاع؟",
            "ما حالة المواد عند الإرجاع؟",
        ],
        DocType::FinancialClaim => &[
            "ما اسم الجهة المطالبة بالسداد؟",
            "ما قيمة المطالبة الإجمالية؟",
            "ما الأعمال أو التوريدات محل المطالبة؟",
            "ما تواريخ الاستحقاق والفواتير المرتبطة؟",
            "هل سبق إرسال إشعارات سداد؟",
        ],
        DocType::PriceQuote => &[
            "ما اسم الجهة طالبة العرض؟",
            "ما البنود والكميات المطلوب تسعيرها؟",
            "ما مدة سريان العرض؟",
            "ما شروط الدفع والتوريد؟",
        ],
        DocType::OfficialLetter => &[
            "ما الجهة الموجه إليها الخطاب؟",
            "ما موضوع الخطاب؟",
            "ما النقاط الأساسية المطلوب ذكرها؟",
        ],
    }
}
